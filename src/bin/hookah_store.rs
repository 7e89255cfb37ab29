use hookah_store::api::{self, ApiResponse};
use hookah_store::config::{self, Config};
use hookah_store::core::Result;
use hookah_store::inventory::Inventory;
use std::io::Read;
use std::path::Path;
use std::process;
use tracing::{debug, info};

/// Picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "hookah.toml";

const USAGE: &str = "Usage: hookah_store [--config PATH] <command>

Commands:
  init           create the store and the tobaccos table
  add <FILE|->   add tobaccos from a JSON file (or stdin)
  list           list tobaccos
  show <MARK>    list tobaccos of one brand
  brands         list distinct brands";

fn load_config(explicit: Option<&str>) -> Result<Config> {
    match explicit {
        Some(path) => config::load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => config::load_config(DEFAULT_CONFIG_FILE),
        None => Ok(Config::default()),
    }
}

fn read_body(source: &str) -> Result<String> {
    if source == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

fn usage_exit() -> ! {
    eprintln!("{}", USAGE);
    process::exit(2);
}

fn print_response(response: &ApiResponse) {
    match serde_json::to_string_pretty(&response.body) {
        Ok(body) => println!("{}", body),
        Err(e) => eprintln!("Failed to render response: {}", e),
    }
}

fn main() {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let mut config_path = None;
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            usage_exit();
        }
        config_path = Some(args.remove(1));
        args.remove(0);
    }

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    debug!("Using store at {}", config.database.path().display());
    let inventory = Inventory::new(config);

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let response = match args.as_slice() {
        ["init"] => match inventory.init() {
            Ok(()) => {
                info!("Store ready");
                println!("Initialized {}", inventory.config().database.path().display());
                return;
            }
            Err(e) => {
                eprintln!("Failed to initialize store: {}", e);
                process::exit(1);
            }
        },
        ["add", source] => match read_body(source) {
            Ok(body) => api::add_tobacco(&inventory, &body),
            Err(e) => {
                eprintln!("Failed to read {}: {}", source, e);
                process::exit(1);
            }
        },
        ["list"] => api::list_tobacco(&inventory),
        ["show", mark] => api::get_by_mark(&inventory, mark),
        ["brands"] => api::get_brands(&inventory),
        _ => usage_exit(),
    };

    print_response(&response);
    if !response.is_success() {
        process::exit(1);
    }
}
