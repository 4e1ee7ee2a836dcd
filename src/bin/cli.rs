//! paramstore CLI Client
//!
//! Command-line interface for a parameter store. With `--endpoint` it talks
//! to a `paramstore-server`; without, it runs against an in-memory backend
//! seeded with the demo entries. Offline changes last for one command.

use clap::{Parser, Subcommand};
use paramstore::demo::demo_backend;
use paramstore::{
    BackendConfig, NewParameter, Parameter, ParameterStore, ParameterUpdate, RemoteConfig,
};
use tracing_subscriber::{fmt, EnvFilter};

/// paramstore CLI
#[derive(Parser, Debug)]
#[command(name = "paramstore-cli")]
#[command(about = "CLI for the paramstore parameter store")]
struct Args {
    /// Service address; omit to use the seeded in-memory backend
    #[arg(short, long, env = "PARAMSTORE_ENDPOINT")]
    endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    /// Print secure values instead of masking them
    #[arg(long)]
    reveal: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List parameters, optionally of one namespace
    List {
        /// Namespace such as ortelius/dev
        namespace: Option<String>,
    },

    /// Create a parameter
    Create {
        namespace: String,
        name: String,
        value: String,

        /// Mark the value as sensitive
        #[arg(long)]
        secure: bool,
    },

    /// Update a parameter's value and/or security flag
    Update {
        namespace: String,
        name: String,

        /// New value
        #[arg(long)]
        value: Option<String>,

        /// New security flag
        #[arg(long)]
        secure: Option<bool>,

        /// Fail unless the stored version matches
        #[arg(long)]
        expect_version: Option<u64>,
    },

    /// Delete a parameter
    Delete { namespace: String, name: String },

    /// Create a new namespace with its first parameter
    CreateNamespace {
        namespace: String,
        name: String,
        value: String,

        #[arg(long)]
        secure: bool,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let opened = match &args.endpoint {
        Some(endpoint) => ParameterStore::open(&BackendConfig::Remote(
            RemoteConfig::new(endpoint)
                .read_timeout_ms(args.timeout_ms)
                .write_timeout_ms(args.timeout_ms),
        )),
        None => demo_backend().map(ParameterStore::with_backend),
    };

    let store = match opened {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&store, args.command, args.reveal) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(store: &ParameterStore, command: Commands, reveal: bool) -> paramstore::Result<()> {
    match command {
        Commands::List { namespace: Some(namespace) } => {
            print_namespace(&namespace, &store.list_namespace(&namespace)?, reveal);
        }
        Commands::List { namespace: None } => {
            for (namespace, parameters) in store.list_all()? {
                print_namespace(&namespace, &parameters, reveal);
            }
        }
        Commands::Create {
            namespace,
            name,
            value,
            secure,
        } => {
            let created = store.create_variable(&namespace, NewParameter::new(name, value, secure))?;
            print_parameter(&created, reveal);
        }
        Commands::Update {
            namespace,
            name,
            value,
            secure,
            expect_version,
        } => {
            let update = ParameterUpdate {
                value,
                is_secure: secure,
                expected_version: expect_version,
            };
            let updated = store.update_variable(&namespace, &name, update)?;
            print_parameter(&updated, reveal);
        }
        Commands::Delete { namespace, name } => {
            store.delete_variable(&namespace, &name)?;
            println!("deleted {}/{}", namespace, name);
        }
        Commands::CreateNamespace {
            namespace,
            name,
            value,
            secure,
        } => {
            let created = store
                .create_namespace_with_variable(&namespace, NewParameter::new(name, value, secure))?;
            print_parameter(&created, reveal);
        }
    }
    Ok(())
}

fn print_namespace(namespace: &str, parameters: &[Parameter], reveal: bool) {
    let label = if namespace.is_empty() { "/" } else { namespace };
    println!("[{}]", label);
    for parameter in parameters {
        print_parameter(parameter, reveal);
    }
}

fn print_parameter(parameter: &Parameter, reveal: bool) {
    let value = if reveal {
        parameter.value.as_str()
    } else {
        parameter.display_value()
    };
    let marker = if parameter.is_secure { " (secure)" } else { "" };
    println!(
        "  {} = {}  v{}{}",
        parameter.name, value, parameter.version, marker
    );
}
