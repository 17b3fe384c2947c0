//!
//! rolegate CLI
//! ------------
//! Evaluates one authorization request against a configuration document and
//! prints the decision as JSON, or probes every protected demo operation for
//! a user.

use std::env;
use std::process;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use rolegate::config::{SecurityConfig, CONFIG_PATH_ENV};
use rolegate::demo::{Orchestrator, ResourceA, ResourceB};
use rolegate::observability;
use rolegate::security::{Action, ResourceType, SecurityManager, TaggedResource};

const EXIT_DENIED: i32 = 3;
const EXIT_CONFIG: i32 = 2;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --user <id> --type <A|B|all> --name <name> [--action read,edit] [--roles r1,r2] [--config <path>]\n  {program} --user <id> --probe [--roles r1,r2] [--config <path>]\n\nFlags:\n  --config <path>     Configuration document (default: ${CONFIG_PATH_ENV}, else the built-in sample)\n  --user <id>         Caller identity\n  --roles <r1,r2>     Roles held by the caller (default: the configured user table)\n  --type <t>          Resource type\n  --name <name>       Resource name\n  --action <a1,a2>    Requested actions (default: read)\n  --probe             Try every protected operation on demo resources a and b\n  -h, --help          Show this help\n\nExit codes: 0 granted, {EXIT_DENIED} denied, {EXIT_CONFIG} configuration error."
    );
}

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    user: String,
    roles: Option<Vec<String>>,
    resource_type: Option<String>,
    name: Option<String>,
    actions: Option<String>,
    probe: bool,
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).map(String::from).collect()
}

fn parse_args(program: &str, args: &[String]) -> Args {
    let mut out = Args::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let needs_value = matches!(flag, "--config" | "--user" | "--roles" | "--type" | "--name" | "--action");
        if needs_value && i + 1 >= args.len() {
            eprintln!("{} requires a value", flag);
            print_usage(program);
            process::exit(EXIT_CONFIG);
        }
        match flag {
            "--config" => out.config = Some(args[i + 1].clone()),
            "--user" => out.user = args[i + 1].clone(),
            "--roles" => out.roles = Some(split_list(&args[i + 1])),
            "--type" => out.resource_type = Some(args[i + 1].clone()),
            "--name" => out.name = Some(args[i + 1].clone()),
            "--action" => out.actions = Some(args[i + 1].clone()),
            "--probe" => { out.probe = true; i += 1; continue; }
            "-h" | "--help" => { print_usage(program); process::exit(0); }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(program);
                process::exit(EXIT_CONFIG);
            }
        }
        i += 2;
    }
    out
}

fn load_config(args: &Args) -> Result<SecurityConfig> {
    let cfg = match &args.config {
        Some(path) => SecurityConfig::from_path(path)?,
        None => SecurityConfig::from_env()?,
    };
    Ok(cfg)
}

fn main() -> Result<()> {
    observability::init_tracing_with("warn");

    let mut argv: Vec<String> = env::args().collect();
    let program = if argv.is_empty() { "rolegate".to_string() } else { argv.remove(0) };
    let args = parse_args(&program, &argv);

    let (cfg, permissions) = match load_config(&args).and_then(|c| {
        let perms = c.build_permissions()?;
        Ok((c, perms))
    }) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("configuration error: {:#}", e);
            process::exit(EXIT_CONFIG);
        }
    };

    let roles = args
        .roles
        .clone()
        .unwrap_or_else(|| cfg.users.get(&args.user).cloned().unwrap_or_default());
    let sm = SecurityManager::new(permissions);
    let ctx = sm.bind_identity(args.user.clone(), roles);
    info!(target: "rolegate::cli", user = %ctx.user(), request_id = %ctx.request_id(), "evaluating");

    if args.probe {
        let a = ResourceA::new(args.name.clone().unwrap_or_else(|| "a".to_string()));
        let b = ResourceB::new("b");
        for line in Orchestrator.probe(&ctx, &a, &b) {
            println!("{}", line);
        }
        return Ok(());
    }

    let outcome = (|| -> Result<_> {
        let ty: ResourceType = args.resource_type.as_deref().ok_or_else(|| anyhow!("--type is required"))?.parse()?;
        let name = args.name.clone().filter(|n| !n.is_empty()).ok_or_else(|| anyhow!("--name is required"))?;
        let actions = split_list(args.actions.as_deref().unwrap_or("read"))
            .iter()
            .map(|a| a.parse::<Action>())
            .collect::<Result<Vec<_>, _>>()?;
        if actions.is_empty() {
            return Err(anyhow!("--action needs at least one action"));
        }
        Ok((TaggedResource::new(name, ty), actions))
    })();
    let (resource, actions) = match outcome {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{:#}", e);
            print_usage(&program);
            process::exit(EXIT_CONFIG);
        }
    };

    let decision = ctx.check(&resource, &actions);
    println!("{}", serde_json::to_string(&decision).context("serialize decision")?);
    if !decision.allow {
        process::exit(EXIT_DENIED);
    }
    Ok(())
}
