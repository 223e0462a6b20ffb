mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;

use kupmios_core::{CoreError, HttpOptions, Kupmios, KupmiosConfig, Provider, ProviderError};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let config = KupmiosConfig {
        call_timeout: Duration::from_secs(args.call_timeout_secs),
        await_tx_timeout: Duration::from_secs(args.await_timeout_secs),
        aux_concurrency: args.aux_concurrency,
        cache_capacity: args.cache_capacity,
        http: HttpOptions {
            requests_per_second: args.requests_per_second,
            ..HttpOptions::default()
        },
        ..KupmiosConfig::default()
    };
    let provider = Kupmios::with_config(&args.kupo_url, &args.ogmios_url, config)
        .wrap_err("build provider")?;

    tracing::debug!(kupo = %args.kupo_url, ogmios = %args.ogmios_url, "provider ready");

    run(&provider, args.command)
        .await
        .map_err(|err| explain(&args.kupo_url, &args.ogmios_url, err))
}

async fn run(provider: &Kupmios, command: Command) -> Result<(), CommandError> {
    match command {
        Command::Params => print_json(&provider.get_protocol_parameters().await?),
        Command::Utxos { target } => print_json(&provider.get_utxos(&target.target()?).await?),
        Command::UtxosWithUnit { target, unit } => print_json(
            &provider
                .get_utxos_with_unit(&target.target()?, &unit)
                .await?,
        ),
        Command::UtxoByUnit { unit } => print_json(&provider.get_utxo_by_unit(&unit).await?),
        Command::UtxosByOutRef { out_refs } => {
            print_json(&provider.get_utxos_by_out_ref(&out_refs).await?)
        }
        Command::Delegation { reward_address } => {
            print_json(&provider.get_delegation(&reward_address).await?)
        }
        Command::Datum { datum_hash } => print_json(&provider.get_datum(&datum_hash).await?),
        Command::AwaitTx {
            tx_hash,
            check_interval_secs,
        } => {
            let interval = check_interval_secs.map(Duration::from_secs);
            print_json(&provider.await_tx(&tx_hash, interval).await?)
        }
        Command::Submit { cbor } => print_json(&provider.submit_tx(&cbor).await?),
        Command::Evaluate { cbor } => print_json(&provider.evaluate_tx(&cbor, &[]).await?),
    }
}

/// Failures of a single command, split so transport problems can carry hints.
enum CommandError {
    Provider(ProviderError),
    Other(eyre::Report),
}

impl From<ProviderError> for CommandError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<eyre::Report> for CommandError {
    fn from(err: eyre::Report) -> Self {
        Self::Other(err)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("render output as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn explain(kupo_url: &str, ogmios_url: &str, err: CommandError) -> eyre::Report {
    let err = match err {
        CommandError::Other(report) => return report,
        CommandError::Provider(err) => err,
    };
    let method = err.method();
    if let CoreError::Transport(transport) = err.cause() {
        let endpoint = match method {
            "get_protocol_parameters" | "get_delegation" | "submit_tx" | "evaluate_tx" => {
                ogmios_url
            }
            _ => kupo_url,
        };
        let message = format_connect_error(endpoint, &error_chain(transport));
        return eyre!(message).wrap_err(format!("{method} failed"));
    }
    if let Some(remote) = err.remote_error() {
        let rendered = serde_json::to_string_pretty(remote).unwrap_or_else(|_| remote.to_string());
        return eyre!("node rejected the request:\n{rendered}").wrap_err(format!("{method} failed"));
    }
    eyre::Report::new(err)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

fn format_connect_error(endpoint: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not reach endpoint `{endpoint}`"),
        format!("transport error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("failed to lookup address") {
        lines.push(
            "hint: hostname resolution failed; verify the endpoint hostname and your DNS/network"
                .into(),
        );
    } else if source_error.contains("Connection refused") || source_error.contains("connect") {
        lines.push(
            "hint: nothing answered; check that the service is running and listening on that port"
                .into(),
        );
    } else if source_error.contains("tls") || source_error.contains("certificate") {
        lines.push(
            "hint: TLS handshake failed; verify certificate trust and that the endpoint uses HTTPS"
                .into(),
        );
    } else if source_error.contains("404") {
        lines.push("hint: endpoint path is invalid; pass the service root URL".into());
    } else if source_error.contains("timed out") {
        lines.push("hint: the endpoint is slow; consider raising --call-timeout-secs".into());
    }

    lines.join("\n")
}
