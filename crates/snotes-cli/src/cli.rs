use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use snotes_core::export::ExportFormat as CoreExportFormat;
use snotes_core::stores::{SortBy, SortOrder};
use snotes_core::{DeleteScope, Permission, RequestStatus};

#[derive(Parser)]
#[command(name = "snotes")]
#[command(about = "Secure Notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name (API endpoint, session, pins)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Quick capture: snotes "my thought here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title (defaults to the first line of the content)
        #[arg(short, long)]
        title: Option<String>,
        /// Note content
        content: Vec<String>,
    },
    /// List owned and shared notes, pinned first
    #[command(alias = "ls")]
    List {
        /// Only notes whose title or content contains this text
        #[arg(short, long)]
        query: Option<String>,
        #[command(flatten)]
        sort: SortArgs,
        /// Number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search notes by title and content
    Search {
        /// Search query
        query: String,
        #[command(flatten)]
        sort: SortArgs,
        /// Number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a note with its collaborators
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing note
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New content (opens $EDITOR when omitted and nothing is piped)
        content: Vec<String>,
    },
    /// Delete a note for yourself or, as owner, for everyone
    Delete {
        /// Note ID or unique ID prefix
        id: String,
        /// Who loses the note
        #[arg(long, value_enum, default_value_t = DeleteScopeArg::Me)]
        scope: DeleteScopeArg,
    },
    /// Toggle the local pin on a note
    Pin {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Download the server rendition of a note
    Download {
        /// Note ID or unique ID prefix
        id: String,
        /// Output path (defaults to <id>.txt)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Manage soft-deleted notes
    Trash {
        #[command(subcommand)]
        command: Option<TrashCommands>,
    },
    /// Review incoming share requests
    Requests {
        #[command(subcommand)]
        command: Option<RequestCommands>,
    },
    /// Manage who a note is shared with
    Share {
        #[command(subcommand)]
        command: ShareCommands,
    },
    /// Show or update your account
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Stream realtime note updates until interrupted
    Watch {
        /// Output each update as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Export notes
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in, sign up, or sign out
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(clap::Args, Clone, Copy, Debug)]
pub struct SortArgs {
    /// Sort field
    #[arg(long, value_enum, default_value_t = SortField::Modified)]
    pub sort: SortField,
    /// Ascending order (newest/Z first by default)
    #[arg(long)]
    pub asc: bool,
}

impl SortArgs {
    pub const fn sort_by(self) -> SortBy {
        match self.sort {
            SortField::Created => SortBy::Created,
            SortField::Modified => SortBy::Modified,
            SortField::Title => SortBy::Title,
        }
    }

    pub const fn sort_order(self) -> SortOrder {
        if self.asc {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortField {
    Created,
    #[value(alias = "updated")]
    Modified,
    Title,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum DeleteScopeArg {
    /// Remove the note from your list only
    Me,
    /// Move the note to trash for everyone (owner only)
    All,
}

impl From<DeleteScopeArg> for DeleteScope {
    fn from(value: DeleteScopeArg) -> Self {
        match value {
            DeleteScopeArg::Me => Self::ForMe,
            DeleteScopeArg::All => Self::ForEveryone,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PermissionArg {
    #[value(alias = "read")]
    ReadOnly,
    Edit,
}

impl From<PermissionArg> for Permission {
    fn from(value: PermissionArg) -> Self {
        match value {
            PermissionArg::ReadOnly => Self::ReadOnly,
            PermissionArg::Edit => Self::Edit,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Accepted,
    Rejected,
}

impl From<StatusArg> for RequestStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => Self::Pending,
            StatusArg::Accepted => Self::Accepted,
            StatusArg::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for CoreExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(value: CompletionShell) -> Self {
        match value {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
            CompletionShell::PowerShell => Self::PowerShell,
        }
    }
}

#[derive(Subcommand)]
pub enum TrashCommands {
    /// List notes in the trash
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a note out of the trash
    Restore {
        /// Trashed note ID or unique ID prefix
        id: String,
    },
    /// Delete a trashed note permanently
    Purge {
        /// Trashed note ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum RequestCommands {
    /// List share requests
    List {
        /// Only requests with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Grant a pending request
    Accept {
        /// Request ID
        id: String,
    },
    /// Decline a pending request
    Reject {
        /// Request ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ShareCommands {
    /// List collaborators of a note
    List {
        /// Note ID or unique ID prefix
        note: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Invite a user by email
    Invite {
        /// Note ID or unique ID prefix
        note: String,
        /// Email of the user to invite
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Access level to grant
        #[arg(long, value_enum, default_value_t = PermissionArg::ReadOnly)]
        permission: PermissionArg,
    },
    /// Change a collaborator's access level
    Permission {
        /// Note ID or unique ID prefix
        note: String,
        /// Collaborator user ID
        user: String,
        /// New access level
        #[arg(value_enum)]
        permission: PermissionArg,
    },
    /// Revoke a collaborator's access
    Remove {
        /// Note ID or unique ID prefix
        note: String,
        /// Collaborator user ID
        user: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in account
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the display name
    Update {
        /// New display name
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// REST base URL (e.g. <https://api.example.com/securenotes>)
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Realtime socket origin, when it differs from the API origin
        #[arg(long, value_name = "URL")]
        socket_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with email/password and store the session in the keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account
    Signup {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        #[arg(long, value_name = "NAME")]
        first_name: String,
        #[arg(long, value_name = "NAME")]
        last_name: String,
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Repeat of the password (defaults to --password)
        #[arg(long, value_name = "PASSWORD")]
        confirm_password: Option<String>,
        /// Accept the terms of service
        #[arg(long)]
        accept_terms: bool,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Logout profile and clear stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
