use clap::ValueEnum;
use std::env;

/// Shells we can emit an integration hook for.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
}

impl ShellType {
    /// Best-effort detection from `$SHELL`, defaulting to bash.
    pub fn detect() -> Self {
        if let Ok(shell) = env::var("SHELL") {
            if shell.ends_with("zsh") {
                return ShellType::Zsh;
            }
        }
        ShellType::Bash
    }

    /// The snippet a user sources from their rc file. It records each
    /// finished command through `histree hook record` and exports a session
    /// id for the lifetime of the shell.
    pub fn hook_script(&self) -> &'static str {
        match self {
            ShellType::Bash => BASH_HOOK,
            ShellType::Zsh => ZSH_HOOK,
        }
    }
}

const BASH_HOOK: &str = r#"# histree shell integration for bash
_histree_hook() {
    local exit_code=$?
    local command=$(history 1 | sed 's/^[ ]*[0-9]*[ ]*//')
    if [ -n "$command" ]; then
        histree hook record "$command" 2>/dev/null || true
    fi
    return $exit_code
}

if [ -z "$HISTREE_SESSION_ID" ]; then
    export HISTREE_SESSION_ID=$(histree hook session-init 2>/dev/null || echo "unknown")
fi

if [[ "$PROMPT_COMMAND" != *"_histree_hook"* ]]; then
    PROMPT_COMMAND="${PROMPT_COMMAND:+$PROMPT_COMMAND; }_histree_hook"
fi
"#;

const ZSH_HOOK: &str = r#"# histree shell integration for zsh
_histree_hook() {
    local exit_code=$?
    local command=$(fc -ln -1)
    if [ -n "$command" ]; then
        histree hook record "$command" 2>/dev/null || true
    fi
    return $exit_code
}

if [ -z "$HISTREE_SESSION_ID" ]; then
    export HISTREE_SESSION_ID=$(histree hook session-init 2>/dev/null || echo "unknown")
fi

autoload -U add-zsh-hook
add-zsh-hook precmd _histree_hook
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_scripts_call_back_into_the_recorder() {
        for shell in [ShellType::Bash, ShellType::Zsh] {
            let script = shell.hook_script();
            assert!(script.contains("histree hook record"));
            assert!(script.contains("HISTREE_SESSION_ID"));
        }
    }

    #[test]
    fn zsh_hook_registers_a_precmd() {
        assert!(ShellType::Zsh.hook_script().contains("add-zsh-hook precmd"));
    }
}
