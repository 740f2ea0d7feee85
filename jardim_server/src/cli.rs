use std::env;

const HELP: &str = include_str!("./cli-help.txt");

/// Variables shown by `--help`. The secrets (`JP_JWT_SECRET`, `JP_WEBHOOK_SECRET`, `JP_ADMIN_PASSWORD`) are left out.
const PUBLIC_ENVS: [&str; 14] = [
    "RUST_LOG",
    "JP_HOST",
    "JP_PORT",
    "JP_DATABASE_URL",
    "JP_JWT_EXPIRY_HOURS",
    "JP_MIN_ORDER_VALUE",
    "JP_WEBHOOK_HMAC_CHECKS",
    "JP_WEBHOOK_HMAC_HEADER",
    "JP_OVERDUE_SWEEP_INTERVAL",
    "JP_USE_X_FORWARDED_FOR",
    "JP_USE_FORWARDED",
    "JP_ADMIN_NAME",
    "JP_ADMIN_EMAIL",
    "JP_ADMIN_CPF",
];

/// The server is configured through the environment only. Any argument at all prints the help text and the current
/// configuration, and returns `true` so that `main` exits without starting the server.
pub fn handle_command_line_args() -> bool {
    if env::args().len() <= 1 {
        return false;
    }
    println!("\n{HELP}\n");
    println!("Current configuration (secrets are not shown):");
    for name in PUBLIC_ENVS {
        println!("  {name:<35} {}", env_value(name));
    }
    true
}

fn env_value(name: &str) -> String {
    match env::var_os(name) {
        None => "Not set".into(),
        Some(v) => v.into_string().unwrap_or_else(|v| format!("Invalid value: {}", v.to_string_lossy())),
    }
}
