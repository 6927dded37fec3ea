use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;
use turret_cli::{commands, logging, Edit, SessionArgs};
use turret_core::{EditorConfig, SubjectOptions};
use turret_model::{OwnerId, SettingCategory};
use turret_schema::ViewMode;

fn subject_args() -> Vec<Arg> {
    vec![
        Arg::new("subject")
            .long("subject")
            .required(true)
            .help("Profile id whose settings are edited"),
        Arg::new("category")
            .long("category")
            .default_value("terminal_profile")
            .help("terminal_profile, terminal_boot, netrix_profile, netrix_boot, tpo_profile or tpo_boot"),
        Arg::new("group")
            .long("group")
            .help("Group to open; the first visible group otherwise"),
        Arg::new("view")
            .long("view")
            .default_value("basic")
            .help("basic, expert or advanced"),
        Arg::new("shared")
            .long("shared")
            .action(ArgAction::SetTrue)
            .help("Subject is a shared profile"),
        Arg::new("inherited")
            .long("inherited")
            .action(ArgAction::SetTrue)
            .help("Show the inherited column"),
        Arg::new("reconstruct")
            .long("reconstruct")
            .action(ArgAction::SetTrue)
            .help("Request a global configuration rebuild after saving"),
        Arg::new("read-only")
            .long("read-only")
            .action(ArgAction::SetTrue)
            .help("Open without save permission"),
    ]
}

fn edit_args() -> Vec<Arg> {
    vec![
        Arg::new("set")
            .long("set")
            .action(ArgAction::Append)
            .value_name("KEY=VALUE")
            .help("Enable a setting with a value"),
        Arg::new("on")
            .long("on")
            .action(ArgAction::Append)
            .value_name("KEY")
            .help("Enable a setting with its existing value or default"),
        Arg::new("off")
            .long("off")
            .action(ArgAction::Append)
            .value_name("KEY")
            .help("Disable a setting"),
    ]
}

fn cli() -> Command {
    Command::new("turret-settings")
        .version(turret_cli::VERSION)
        .about("Inspect and edit turret settings")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor configuration (TOML)"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .default_value("settings.json")
                .value_parser(value_parser!(PathBuf))
                .help("Settings backend file"),
        )
        .arg(
            Arg::new("schema-dir")
                .long("schema-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the settings schema documents"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Default log filter when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("groups")
                .about("List the groups shown to the subject")
                .args(subject_args()),
        )
        .subcommand(
            Command::new("render")
                .about("Render a group")
                .args(subject_args())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Show what edits would change without saving")
                .args(subject_args())
                .args(edit_args()),
        )
        .subcommand(
            Command::new("save")
                .about("Validate and save edits")
                .args(subject_args())
                .args(edit_args()),
        )
        .subcommand(
            Command::new("check-schema")
                .about("Parse a schema document and summarize it")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<EditorConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EditorConfig::from_toml_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => EditorConfig::new(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("schema-dir") {
        config = config.with_schema_dir(dir.clone());
    }
    Ok(config)
}

fn session_args(matches: &ArgMatches, config: EditorConfig) -> anyhow::Result<SessionArgs> {
    let text = |name: &str| matches.get_one::<String>(name).map(String::as_str);

    let subject = text("subject").ok_or_else(|| anyhow!("--subject is required"))?;
    let category: SettingCategory = text("category").unwrap_or("terminal_profile").parse()?;
    let view: ViewMode = text("view")
        .unwrap_or("basic")
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let options = SubjectOptions::new()
        .with_shared_profile(matches.get_flag("shared"))
        .with_display_inherited(matches.get_flag("inherited"))
        .with_reconstruct_global_config(matches.get_flag("reconstruct"))
        .with_can_save(!matches.get_flag("read-only"));

    Ok(SessionArgs {
        data: matches
            .get_one::<PathBuf>("data")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("settings.json")),
        config,
        subject: OwnerId::new(subject),
        category,
        group: text("group").map(str::to_string),
        view,
        options,
    })
}

fn edits(matches: &ArgMatches) -> anyhow::Result<Vec<Edit>> {
    let values = |name: &str| {
        matches
            .get_many::<String>(name)
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
    };

    let mut edits = Vec::new();
    for raw in values("set") {
        edits.push(raw.parse::<Edit>()?);
    }
    edits.extend(values("on").into_iter().map(|key| Edit::On { key }));
    edits.extend(values("off").into_iter().map(|key| Edit::Off { key }));
    Ok(edits)
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    logging::init(level, matches.get_flag("json-logs"));

    let config = load_config(&matches)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match matches.subcommand() {
        Some(("groups", args)) => commands::groups(&session_args(args, config)?, &mut out)?,
        Some(("render", args)) => {
            commands::render(&session_args(args, config)?, args.get_flag("json"), &mut out)?
        }
        Some(("apply", args)) => {
            commands::apply(&session_args(args, config)?, &edits(args)?, &mut out)?;
        }
        Some(("save", args)) => commands::save(&session_args(args, config)?, &edits(args)?, &mut out)?,
        Some(("check-schema", args)) => {
            let file = args
                .get_one::<PathBuf>("file")
                .ok_or_else(|| anyhow!("schema file is required"))?;
            commands::check_schema(file, &mut out)?
        }
        _ => cli().print_help()?,
    }
    out.flush()?;
    Ok(())
}
