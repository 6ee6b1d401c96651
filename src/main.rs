use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use color_eyre::Result;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{ApiClient, RestRepository},
    config::FileConfigStore,
    tui::{run_tui, App},
};
use application::{
    parse_field, AppError, AppResult, Dispatcher, EntityForm, Route, Services, Store, StoreAction,
    StoreEntity, Submission, ViewEffect,
};
use domain::{
    parse_filters, Comment, Criteria, DomainError, Entity, EntityId, EntityKind, Filter, Message,
    Project, Sort, Task, UserInfo,
};
use ports::{AppConfig, ConfigStore};

fn id_arg() -> Arg {
    Arg::new("id")
        .help("Entity identifier")
        .required(true)
        .value_parser(value_parser!(i64))
        .index(1)
}

fn set_arg(required: bool) -> Arg {
    Arg::new("set")
        .long("set")
        .short('s')
        .value_name("FIELD=VALUE")
        .help("Field value, in the same local format the forms use (repeatable)")
        .action(ArgAction::Append)
        .required(required)
}

fn entity_command(kind: EntityKind) -> Command {
    let fields = kind
        .fields()
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(", ");

    Command::new(kind.segment())
        .about(format!("{} operations", kind.label()))
        .after_help(format!("Fields: {fields}"))
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about(format!("List {} as JSON", kind.plural_label().to_lowercase()))
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .value_name("FIELD.OP=VALUE")
                        .help("Criteria filter such as status.equals=NEW (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_name("STATUS")
                        .value_delimiter(',')
                        .help("Only entities in one of these statuses (repeatable or comma separated)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Fetch every page instead of a single one")
                        .conflicts_with("page")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_name("FIELD[,asc|desc]")
                        .help("Sort order"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(value_parser!(u32))
                        .help("Zero-based page number"),
                )
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_parser(value_parser!(u32))
                        .help("Page size"),
                ),
        )
        .subcommand(Command::new("get").about(format!("Get a {} by ID", kind.label())).arg(id_arg()))
        .subcommand(Command::new("create").about(format!("Create a {}", kind.label())).arg(set_arg(false)))
        .subcommand(
            Command::new("update")
                .about(format!("Replace a {} (PUT) with the given fields changed", kind.label()))
                .arg(id_arg())
                .arg(set_arg(true)),
        )
        .subcommand(
            Command::new("patch")
                .about(format!("Send only the given fields of a {} (PATCH)", kind.label()))
                .arg(id_arg())
                .arg(set_arg(true)),
        )
        .subcommand(Command::new("delete").about(format!("Delete a {}", kind.label())).arg(id_arg()))
}

fn cli() -> Command {
    Command::new("projects-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A terminal client for the projects and tasks tracker")
        .long_about("Browse and edit projects, tasks, comments, user infos and messages.\n\nWithout a subcommand the interactive terminal UI starts.")
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Backend base URL (can also be set via PROJECTS_API_URL env var)")
                .global(true),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("Bearer token (can also be set via PROJECTS_TOKEN env var)")
                .global(true),
        )
        .arg(
            Arg::new("route")
                .long("route")
                .value_name("ROUTE")
                .default_value("/project")
                .help("Screen to open the terminal UI on, e.g. /task?status.equals=NEW"),
        )
        .subcommands(EntityKind::iter().map(entity_command))
        .subcommand(
            Command::new("config")
                .about("Show or change the stored configuration")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Store settings; --base-url and --token given here are saved")
                        .arg(
                            Arg::new("timeout")
                                .long("timeout")
                                .value_parser(value_parser!(u64))
                                .help("Request timeout in seconds"),
                        )
                        .arg(
                            Arg::new("page-size")
                                .long("page-size")
                                .value_parser(value_parser!(u32))
                                .help("Default page size for lists"),
                        ),
                ),
        )
}

fn build_services(config: &AppConfig, dispatcher: Dispatcher) -> AppResult<Services> {
    let client = ApiClient::new(config)?;
    let page_size = config.page_size;

    Ok(Services::new(
        dispatcher,
        Arc::new(RestRepository::<Project>::new(client.clone()).with_page_size(page_size)),
        Arc::new(RestRepository::<Task>::new(client.clone()).with_page_size(page_size)),
        Arc::new(RestRepository::<Comment>::new(client.clone()).with_page_size(page_size)),
        Arc::new(RestRepository::<UserInfo>::new(client.clone()).with_page_size(page_size)),
        Arc::new(RestRepository::<Message>::new(client).with_page_size(page_size)),
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| AppError::Application(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn criteria_from_args(matches: &ArgMatches) -> AppResult<Criteria> {
    let mut filters = matches
        .get_many::<String>("filter")
        .map(|values| parse_filters(values))
        .transpose()?
        .unwrap_or_default();

    if let Some(statuses) = matches.get_many::<String>("status") {
        filters.push(Filter::one_of("status", statuses));
    }

    Ok(Criteria {
        filters,
        sort: matches.get_one::<String>("sort").map(|s| s.parse::<Sort>()).transpose()?,
        page: matches.get_one::<u32>("page").copied(),
        size: matches.get_one::<u32>("size").copied(),
        all_pages: matches.get_flag("all"),
    })
}

fn assignments(matches: &ArgMatches) -> AppResult<Vec<(String, String)>> {
    matches
        .get_many::<String>("set")
        .into_iter()
        .flatten()
        .map(|raw| {
            raw.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| AppError::Application(format!("Expected FIELD=VALUE, got '{raw}'")))
        })
        .collect()
}

fn fill_form(form: &mut EntityForm, matches: &ArgMatches) -> AppResult<()> {
    for (name, value) in assignments(matches)? {
        form.set(&name, value)?;
    }
    Ok(())
}

fn submitted<E: Entity>(submission: Result<Submission<E>, Vec<DomainError>>) -> AppResult<E> {
    match submission.map_err(AppError::Validation)? {
        Submission::Create(entity) | Submission::Update(entity) => Ok(entity),
    }
}

/// Runs one subcommand against `E` and prints the container afterwards.
async fn run_entity_command<E: StoreEntity>(
    services: &Services,
    actions: &mut UnboundedReceiver<StoreAction>,
    matches: &ArgMatches,
) -> AppResult<()> {
    let service = services.service::<E>();
    let mut store = Store::new();
    let id = || matches.subcommand().and_then(|(_, m)| m.get_one::<i64>("id").copied()).map(EntityId);

    match matches.subcommand() {
        Some(("list", list_matches)) => {
            let criteria = criteria_from_args(list_matches)?;
            service.get_entities(&criteria).await?;
            store.drain(actions);
            print_json(&store.state::<E>().entities)
        }
        Some(("get", _)) => {
            let id = id().ok_or_else(|| AppError::Application("Missing id".to_string()))?;
            service.get_entity(id).await?;
            store.drain(actions);
            print_json(&store.state::<E>().entity)
        }
        Some(("create", create_matches)) => {
            services.execute(ViewEffect::FetchRelated(E::KIND)).await?;
            store.drain(actions);

            let mut form = EntityForm::for_new::<E>();
            fill_form(&mut form, create_matches)?;
            let entity = submitted(form.submit(&E::default(), &store.related()))?;

            service.create_entity(&entity).await?;
            store.drain(actions);
            print_json(&store.state::<E>().entity)
        }
        Some(("update", update_matches)) => {
            let id = id().ok_or_else(|| AppError::Application("Missing id".to_string()))?;
            services.execute(ViewEffect::FetchRelated(E::KIND)).await?;
            service.get_entity(id).await?;
            store.drain(actions);

            let loaded = store.state::<E>().entity.clone();
            let mut form = EntityForm::for_edit(&loaded);
            fill_form(&mut form, update_matches)?;
            let entity = submitted(form.submit(&loaded, &store.related()))?;

            service.update_entity(&entity).await?;
            store.drain(actions);
            print_json(&store.state::<E>().entity)
        }
        Some(("patch", patch_matches)) => {
            let id = id().ok_or_else(|| AppError::Application("Missing id".to_string()))?;
            services.execute(ViewEffect::FetchRelated(E::KIND)).await?;
            store.drain(actions);

            let mut entity: E = serde_json::from_value(serde_json::json!({ "id": id.0 }))
                .map_err(|e| AppError::Application(e.to_string()))?;
            let related = store.related();
            for (name, raw) in assignments(patch_matches)? {
                let spec = E::field(&name).ok_or_else(|| DomainError::UnknownField(name.clone()))?;
                let value = parse_field(spec, &raw)?;
                entity.set_field(&name, value, &related)?;
            }

            service.partial_update(&entity).await?;
            store.drain(actions);
            print_json(&store.state::<E>().entity)
        }
        Some(("delete", _)) => {
            let id = id().ok_or_else(|| AppError::Application("Missing id".to_string()))?;
            service.delete_entity(id).await?;
            store.drain(actions);
            println!("Deleted {} {}", E::KIND.label(), id);
            Ok(())
        }
        _ => Err(AppError::Application(format!("Unknown {} subcommand", E::KIND))),
    }
}

/// `--token` and `--base-url` win over everything else.
fn apply_global_flags(config: &mut AppConfig, matches: &ArgMatches) {
    if let Some(token) = matches.get_one::<String>("token") {
        config.api_token = Some(token.clone());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
}

/// Stored settings plus what `config set` was given; environment values never end up here.
fn settings_to_save(mut stored: AppConfig, set_matches: &ArgMatches) -> AppConfig {
    apply_global_flags(&mut stored, set_matches);
    if let Some(timeout) = set_matches.get_one::<u64>("timeout") {
        stored.request_timeout_seconds = *timeout;
    }
    if let Some(page_size) = set_matches.get_one::<u32>("page-size") {
        stored.page_size = Some(*page_size);
    }
    stored
}

async fn run_config_command(store: &FileConfigStore, config: AppConfig, matches: &ArgMatches) -> AppResult<()> {
    match matches.subcommand() {
        Some(("show", _)) => print_json(&serde_json::json!({
            "config_file": store.config_path().display().to_string(),
            "base_url": config.base_url,
            "request_timeout_seconds": config.request_timeout_seconds,
            "page_size": config.page_size,
            "api_token": if config.api_token.is_some() { "set" } else { "not set" },
        })),
        Some(("set", set_matches)) => {
            let stored = store.load_stored_config().await?;
            store.save_config(&settings_to_save(stored, set_matches)).await?;
            println!("Saved configuration to {}", store.config_path().display());
            Ok(())
        }
        _ => Err(AppError::Application("Unknown config subcommand".to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // The terminal belongs to the UI, so logs go to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("projects-cli.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("projects_cli=debug")),
        )
        .init();

    let matches = cli().get_matches();

    let config_store = FileConfigStore::new()?;
    let mut config = config_store.load_config().await?;
    apply_global_flags(&mut config, &matches);
    tracing::info!("Using backend at {}", config.base_url);

    if let Some(("config", config_matches)) = matches.subcommand() {
        if let Err(e) = run_config_command(&config_store, config, config_matches).await {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let (dispatcher, mut actions) = Dispatcher::channel();
    let services = Arc::new(build_services(&config, dispatcher)?);

    match matches.subcommand() {
        Some((name, entity_matches)) => {
            let kind: EntityKind = name
                .parse()
                .map_err(|_| AppError::Application(format!("Unknown command {name}")))?;

            let result = match kind {
                EntityKind::Project => run_entity_command::<Project>(&services, &mut actions, entity_matches).await,
                EntityKind::Task => run_entity_command::<Task>(&services, &mut actions, entity_matches).await,
                EntityKind::Comment => run_entity_command::<Comment>(&services, &mut actions, entity_matches).await,
                EntityKind::UserInfo => run_entity_command::<UserInfo>(&services, &mut actions, entity_matches).await,
                EntityKind::Message => run_entity_command::<Message>(&services, &mut actions, entity_matches).await,
            };

            if let Err(e) = result {
                tracing::error!("{} command failed: {}", kind, e);
                eprintln!("❌ {} command failed: {e}", kind.label());
                std::process::exit(1);
            }
        }
        None => {
            let route: Route = matches
                .get_one::<String>("route")
                .map(String::as_str)
                .unwrap_or("/project")
                .parse()
                .map_err(AppError::from)?;

            let app = App::new(services, actions, route);

            if let Err(e) = run_tui(app).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_list_arguments_become_criteria() {
        let matches = cli().get_matches_from([
            "projects-cli",
            "task",
            "list",
            "--filter",
            "status.in=NEW,ACTIVE",
            "-f",
            "name.contains=api",
            "--sort",
            "created,desc",
            "--size",
            "5",
        ]);
        let (_, task_matches) = matches.subcommand().unwrap();
        let (_, list_matches) = task_matches.subcommand().unwrap();

        let criteria = criteria_from_args(list_matches).unwrap();
        assert_eq!(criteria.filters.len(), 2);
        assert_eq!(criteria.size, Some(5));
        assert_eq!(
            criteria.to_query_params().last(),
            Some(&("sort".to_string(), "created,desc".to_string()))
        );
    }

    #[test]
    fn test_status_and_all_flags() {
        let matches = cli().get_matches_from([
            "projects-cli",
            "project",
            "list",
            "--status",
            "NEW,ACTIVE",
            "--status",
            "ENDED",
            "--all",
        ]);
        let (_, project_matches) = matches.subcommand().unwrap();
        let (_, list_matches) = project_matches.subcommand().unwrap();

        let criteria = criteria_from_args(list_matches).unwrap();
        assert!(criteria.all_pages);
        assert_eq!(
            criteria.to_query_params(),
            vec![("status.in".to_string(), "NEW,ACTIVE,ENDED".to_string())]
        );
    }

    #[test]
    fn test_set_arguments_fill_form() {
        let matches = cli().get_matches_from([
            "projects-cli",
            "user-info",
            "create",
            "--set",
            "email=ada@example.com",
            "-s",
            "name=Ada",
            "-s",
            "comment=a=b",
        ]);
        let (_, kind_matches) = matches.subcommand().unwrap();
        let (_, create_matches) = kind_matches.subcommand().unwrap();

        let mut form = EntityForm::for_new::<UserInfo>();
        fill_form(&mut form, create_matches).unwrap();
        assert_eq!(form.value("comment"), Some("a=b"));

        let user = submitted(form.submit(&UserInfo::default(), &Default::default())).unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.id, None);
    }

    #[test]
    fn test_config_set_saves_only_stored_values_and_flags() {
        let stored = AppConfig {
            base_url: "https://saved.example.com".to_string(),
            ..Default::default()
        };

        let matches = cli().get_matches_from(["projects-cli", "config", "set", "--timeout", "5"]);
        let (_, config_matches) = matches.subcommand().unwrap();
        let (_, set_matches) = config_matches.subcommand().unwrap();

        let saved = settings_to_save(stored.clone(), set_matches);
        assert_eq!(saved.request_timeout_seconds, 5);
        assert_eq!(saved.base_url, "https://saved.example.com");
        assert_eq!(saved.api_token, None);

        let matches = cli().get_matches_from(["projects-cli", "config", "set", "--token", "abc", "--page-size", "20"]);
        let (_, config_matches) = matches.subcommand().unwrap();
        let (_, set_matches) = config_matches.subcommand().unwrap();

        let saved = settings_to_save(stored, set_matches);
        assert_eq!(saved.api_token.as_deref(), Some("abc"));
        assert_eq!(saved.page_size, Some(20));
    }

    #[test]
    fn test_unknown_field_in_set_is_an_error() {
        let matches = cli().get_matches_from(["projects-cli", "message", "create", "--set", "priority=high"]);
        let (_, kind_matches) = matches.subcommand().unwrap();
        let (_, create_matches) = kind_matches.subcommand().unwrap();

        let mut form = EntityForm::for_new::<Message>();
        assert!(fill_form(&mut form, create_matches).is_err());
    }
}
