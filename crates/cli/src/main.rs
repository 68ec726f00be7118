use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use yaddoo::profile::{Gender, ProfileStore};
use yaddoo::reply::ReplyClient;
use yaddoo::transcript::{Bubble, BubbleStyle};
use yaddoo::{ChatView, ChatWidget};

#[derive(Parser)]
#[command(name = "yaddoo")]
#[command(about = "Yaddoo CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: YADDOO_CONFIG_PATH or ~/.yaddoo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Chat with Yaddoo (interactive). Asks for a name and gender first if no profile is stored.
    Chat {
        /// Config file path (default: YADDOO_CONFIG_PATH or ~/.yaddoo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Reply service base URL (overrides YADDOO_API_BASE and config)
        #[arg(long, value_name = "URL")]
        api_base: Option<String>,
    },

    /// Query the reply service's /health endpoint and print the result.
    Health {
        /// Config file path (default: YADDOO_CONFIG_PATH or ~/.yaddoo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Reply service base URL (overrides YADDOO_API_BASE and config)
        #[arg(long, value_name = "URL")]
        api_base: Option<String>,
    },

    /// Show or clear the stored profile.
    Profile {
        /// Config file path (default: YADDOO_CONFIG_PATH or ~/.yaddoo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile as JSON
    Show,
    /// Remove the stored profile
    Clear,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("yaddoo {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config, api_base }) => {
            if let Err(e) = run_chat(config, api_base).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Health { config, api_base }) => {
            if let Err(e) = run_health(config, api_base).await {
                log::error!("health check failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Profile { config, action }) => {
            if let Err(e) = run_profile(config, action) {
                log::error!("profile failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(yaddoo::config::default_config_path);
    let dir = yaddoo::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

/// Widget from config, with `--api-base` taking precedence over env and file.
fn build_widget(
    config_path: Option<PathBuf>,
    api_base: Option<String>,
) -> anyhow::Result<ChatWidget> {
    let (config, path) = yaddoo::config::load_config(config_path)?;
    let widget = match api_base {
        Some(base) => {
            let store =
                ProfileStore::new(yaddoo::config::resolve_profile_path(&config, &path));
            ChatWidget::new(store, ReplyClient::new(base))
        }
        None => ChatWidget::from_config(&config, &path),
    };
    log::info!("reply service at {}", widget.client().base_url());
    Ok(widget)
}

async fn run_health(
    config_path: Option<PathBuf>,
    api_base: Option<String>,
) -> anyhow::Result<()> {
    let widget = build_widget(config_path, api_base)?;
    let json = widget.health().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn run_profile(config_path: Option<PathBuf>, action: ProfileAction) -> anyhow::Result<()> {
    let (config, path) = yaddoo::config::load_config(config_path)?;
    let store = ProfileStore::new(yaddoo::config::resolve_profile_path(&config, &path));
    match action {
        ProfileAction::Show => match store.load() {
            Some(p) => println!("{}", serde_json::to_string_pretty(&p)?),
            None => println!("no profile stored at {}", store.path().display()),
        },
        ProfileAction::Clear => {
            store.clear();
            println!("cleared profile at {}", store.path().display());
        }
    }
    Ok(())
}

/// Terminal side of the chat: the input line is already consumed when we see it, so only the
/// send lock is visible (as a waiting marker).
struct TerminalView;

impl ChatView for TerminalView {
    fn set_send_enabled(&mut self, enabled: bool) {
        if !enabled {
            print!("  …\r");
            let _ = io::stdout().flush();
        }
    }
}

/// Prints bubbles that appeared since the last call.
struct Printer {
    shown: usize,
}

impl Printer {
    fn flush(&mut self, widget: &ChatWidget) {
        let bubbles = widget.chat.transcript().bubbles();
        if bubbles.len() < self.shown {
            self.shown = 0;
        }
        let user = widget.user_avatar().label;
        let assistant = widget.assistant_avatar().label;
        for b in &bubbles[self.shown..] {
            let who = if b.is_user() { &user } else { &assistant };
            println!("{}", format_bubble(b, who));
        }
        self.shown = bubbles.len();
    }
}

fn format_bubble(b: &Bubble, who: &str) -> String {
    let marker = match b.style {
        BubbleStyle::Error => "! ",
        _ => "",
    };
    format!("[{}] {}{}: {}", b.time, marker, who, b.text.trim())
}

fn read_line(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Terminal gate: ask until a name and gender are given. Returns false on end of input.
fn run_gate(widget: &mut ChatWidget) -> io::Result<bool> {
    if widget.gate.take_focus_request() {
        println!("-- sign in --");
    }
    while widget.gate.is_visible() {
        let Some(name) = read_line("name: ")? else {
            return Ok(false);
        };
        let Some(gender) = read_line("gender (male/female): ")? else {
            return Ok(false);
        };
        widget.sign_in(&name, Gender::parse(&gender));
    }
    Ok(true)
}

/// Local chat commands. Anything starting with `/` is a command and never reaches the service.
#[derive(Debug, PartialEq, Eq)]
enum SlashCommand {
    Exit,
    Switch,
    Logout,
    Health,
    Unknown(String),
}

fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }
    let cmd = input.to_ascii_lowercase();
    Some(match cmd.as_str() {
        "/exit" | "/quit" => SlashCommand::Exit,
        "/switch" => SlashCommand::Switch,
        "/logout" => SlashCommand::Logout,
        "/health" => SlashCommand::Health,
        _ => SlashCommand::Unknown(input.to_string()),
    })
}

async fn run_chat(config_path: Option<PathBuf>, api_base: Option<String>) -> anyhow::Result<()> {
    let mut widget = build_widget(config_path, api_base)?;
    let mut printer = Printer { shown: 0 };
    let mut view = TerminalView;

    widget.boot();
    println!("commands: /switch, /logout, /health, /exit");

    loop {
        if widget.gate.is_visible() && !run_gate(&mut widget)? {
            break;
        }
        printer.flush(&widget);

        let Some(input) = read_line("> ")? else {
            break;
        };
        match parse_command(&input) {
            Some(SlashCommand::Exit) => break,
            Some(SlashCommand::Switch) => widget.switch_profile(),
            Some(SlashCommand::Logout) => widget.logout(&mut view),
            Some(SlashCommand::Health) => match widget.health().await {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("health error: {}", e),
            },
            Some(SlashCommand::Unknown(cmd)) => {
                eprintln!("unknown command {} (try /switch, /logout, /health, /exit)", cmd);
            }
            None => {
                widget.send(&input, &mut view).await;
            }
        }
        printer.flush(&widget);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaddoo::chat_log::Role;

    #[test]
    fn error_bubbles_are_marked() {
        let b = Bubble::new(Role::Assistant, "صار شي", BubbleStyle::Error);
        let line = format_bubble(&b, "يَدّوه");
        assert!(line.ends_with("! يَدّوه: صار شي"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn slash_commands_ignore_case() {
        assert_eq!(parse_command("/EXIT"), Some(SlashCommand::Exit));
        assert_eq!(parse_command("/Quit"), Some(SlashCommand::Exit));
        assert_eq!(parse_command("/Switch"), Some(SlashCommand::Switch));
        assert_eq!(parse_command(" /LOGOUT "), Some(SlashCommand::Logout));
        assert_eq!(parse_command("/Health"), Some(SlashCommand::Health));
    }

    #[test]
    fn unknown_slash_commands_stay_local() {
        assert_eq!(
            parse_command("/help"),
            Some(SlashCommand::Unknown("/help".to_string()))
        );
        assert_eq!(parse_command("مرحبا"), None);
        assert_eq!(parse_command("what is 1/2"), None);
    }

    #[test]
    fn chat_accepts_api_base_flag() {
        let cli = Cli::try_parse_from(["yaddoo", "chat", "--api-base", "http://pi.local:3000"])
            .unwrap();
        match cli.command {
            Some(Commands::Chat { api_base, config }) => {
                assert_eq!(api_base.as_deref(), Some("http://pi.local:3000"));
                assert!(config.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }
}
