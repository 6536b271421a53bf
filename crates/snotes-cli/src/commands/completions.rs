use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

/// Print the completion script, or write it to `output_path` and tell the
/// user how to load it.
pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_completions(shell);

    let Some(path) = output_path else {
        io::stdout().write_all(&script)?;
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &script)?;
    println!("{}", path.display());
    eprintln!("{}", activation_hint(shell, path));
    Ok(())
}

pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    let mut script = Vec::new();
    generate(Shell::from(shell), &mut command, bin_name, &mut script);
    script
}

pub fn activation_hint(shell: CompletionShell, path: &Path) -> String {
    let path = path.display();
    match shell {
        CompletionShell::Bash => format!("Add `source {path}` to ~/.bashrc"),
        CompletionShell::Zsh => {
            format!("Place {path} in a directory on $fpath, then run `compinit`")
        }
        CompletionShell::Fish => {
            "Fish loads completions from ~/.config/fish/completions automatically".to_string()
        }
        CompletionShell::PowerShell => format!("Add `. {path}` to your $PROFILE"),
    }
}
