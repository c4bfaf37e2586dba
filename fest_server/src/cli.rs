use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
        display_secrets();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

// Be explicit about which envars to print, so as to avoid accidentally exposing secrets
const DISPLAY_ENVS: [&str; 17] = [
    "RUST_LOG",
    "FEST_HOST",
    "FEST_PORT",
    "FEST_DATABASE_URL",
    "FEST_DB_MAX_CONNECTIONS",
    "FEST_DB_CONNECT_TIMEOUT",
    "FEST_RUN_MIGRATIONS",
    "FEST_RAZORPAY_KEY_ID",
    "FEST_RAZORPAY_API_URL",
    "FEST_ADMIN_TOKEN_TTL_MINUTES",
    "FEST_SMTP_HOST",
    "FEST_SMTP_PORT",
    "FEST_SMTP_USER",
    "FEST_MAIL_FROM_NAME",
    "FEST_MAIL_REDELIVERY_DELAY_SECS",
    "FEST_RETRY_BASE_DELAY_MS",
    "FEST_NOTIFY_RETRY_BASE_DELAY_MS",
];

// Only whether these are set is ever printed.
const SECRET_ENVS: [&str; 4] = ["FEST_RAZORPAY_KEY_SECRET", "FEST_ADMIN_PASSWORD", "FEST_JWT_SECRET", "FEST_SMTP_PASSWORD"];

fn display_envs() {
    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}

fn display_secrets() {
    println!("\nSecrets:");
    SECRET_ENVS.iter().for_each(|&name| println!("  {name:<35} {}", secret_status(env::var(name))));
}

fn secret_status(value: Result<String, VarError>) -> &'static str {
    match value {
        Ok(s) if !s.trim().is_empty() => "Set",
        Ok(_) => "Empty",
        Err(VarError::NotPresent) => "Not set",
        Err(VarError::NotUnicode(_)) => "Invalid value",
    }
}
