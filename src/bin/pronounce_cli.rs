//! pronounce-cli: 发音练习 API 的命令行客户端
//!
//! Usage:
//!   pronounce-cli [--email <email> --password <password>] <COMMAND> [ARGS]

use anyhow::{bail, Context};
use pronounce_client::schema::{LoginForm, VocabularySearchParams};
use pronounce_client::{logging, AppContext, ClientConfig};
use serde::Serialize;

struct Args {
    email: Option<String>,
    password: Option<String>,
    command: String,
    rest: Vec<String>,
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut email = None;
    let mut password = None;
    let mut positional = Vec::new();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--email" => email = Some(iter.next().context("--email needs a value")?.clone()),
            "--password" => {
                password = Some(iter.next().context("--password needs a value")?.clone())
            }
            _ => positional.push(arg.clone()),
        }
    }
    if positional.is_empty() {
        bail!("missing command");
    }
    let command = positional.remove(0);
    Ok(Args {
        email,
        password,
        command,
        rest: positional,
    })
}

fn print_usage() {
    println!(
        r#"pronounce-cli: pronunciation-coaching API client

USAGE:
    pronounce-cli [--email <email> --password <password>] <COMMAND> [ARGS]

COMMANDS:
    me                  Show the signed-in user
    words [query]       List words, or search when a query is given
    categories          List vocabulary categories
    tags                List vocabulary tags
    stats               Show practice statistics
    sessions            Show recent practice sessions
    goals               Show practice goals
    help                Show this help message

ENVIRONMENT:
    PRONOUNCE_API_BASE_URL      Backend origin (default http://localhost:3000)
    PRONOUNCE_DEV_MODE          Log every request
    RUST_LOG                    Log filter override"#
    );
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() || matches!(raw[0].as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }
    let args = parse_args(&raw)?;

    let config = ClientConfig::from_env().context("invalid configuration")?;
    logging::init(config.dev_mode);
    let ctx = AppContext::new(config)?;

    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let resp = ctx
            .auth()
            .login(&LoginForm::new(email.as_str(), password.as_str()))
            .await
            .context("login failed")?;
        tracing::info!(user = resp.user.email.as_str(), "signed in");
    }

    let outcome = run(&ctx, &args).await;
    if ctx.session().is_authenticated() {
        ctx.auth().logout().await;
    }
    outcome
}

async fn run(ctx: &AppContext, args: &Args) -> anyhow::Result<()> {
    match args.command.as_str() {
        "me" => match ctx.auth().current_user().await? {
            Some(user) => print_json(&user),
            None => bail!("not signed in; pass --email and --password"),
        },
        "words" => {
            let params = VocabularySearchParams::default();
            let page = match args.rest.first() {
                Some(query) => ctx.vocabulary().search_words(query, &params).await?,
                None => ctx.vocabulary().words(&params).await?,
            };
            print_json(&page)
        }
        "categories" => print_json(&ctx.vocabulary().categories().await?),
        "tags" => print_json(&ctx.vocabulary().tags().await?),
        "stats" => print_json(&ctx.practice().stats().await?),
        "sessions" => print_json(&ctx.practice().recent_sessions().await?),
        "goals" => print_json(&ctx.practice().goals().await?),
        other => {
            print_usage();
            bail!("unknown command: {other}")
        }
    }
}
