use clap::Parser;
use toastnotes::cli::{
    handle_delete, handle_list, handle_open, handle_rename, handle_save, handle_search,
    handle_serve, handle_sync, handle_upload, load_config, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

/// Log to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the default filter.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let long_running = matches!(cli.command, Commands::Serve { .. } | Commands::Sync { .. });
    init_tracing(if long_running {
        "toastnotes=info,tower_http=info"
    } else {
        "toastnotes=warn"
    });

    let result = load_config(cli.config.as_deref(), cli.root).and_then(|config| match cli.command {
        Commands::Serve { bind, static_dir } => handle_serve(config, bind, static_dir),
        Commands::Save {
            name,
            content,
            stdin,
        } => handle_save(config, name, content, stdin),
        Commands::Open { name } => handle_open(config, name),
        Commands::Delete { name } => handle_delete(config, name),
        Commands::Rename { old_name, new_name } => handle_rename(config, old_name, new_name),
        Commands::List { tree, json } => handle_list(config, tree, json),
        Commands::Search { query, json } => handle_search(config, query, json),
        Commands::Upload { file, json } => handle_upload(config, file, json),
        Commands::Sync {
            server,
            name,
            file,
            interval,
        } => handle_sync(config, server, name, file, interval),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
