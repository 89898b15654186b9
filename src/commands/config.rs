use colored::*;
use eyre::{Result, bail};

use crate::cli::{ConfigAction, OutputFormat};
use netout::Config;
use netout::sink::{SinkConfig, StreamTarget};

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "netout Configuration".bold());
            println!();
            println!("  trigger: {}", config.trigger);
            println!("  formatstring: {}", config.formatstring);
            println!("  filename: {}", config.filename);
            println!("  posturl: {}", config.posturl);
            println!("  timeout_secs: {}", config.timeout_secs);
            println!("  log_level: {}", config.log_level.as_filter());
            println!();
            println!("{}: {}", "sink".cyan(), describe_sink(&config.sink_config()));
        }
    }

    Ok(())
}

fn describe_sink(sink: &SinkConfig) -> String {
    match sink {
        SinkConfig::Discard => "discard".to_string(),
        SinkConfig::Stream(StreamTarget::Stdout) => "stdout".to_string(),
        SinkConfig::Stream(StreamTarget::Stderr) => "stderr".to_string(),
        SinkConfig::Stream(StreamTarget::File(path)) => format!("file {}", path.display()),
        SinkConfig::Remote { url, timeout } => format!("POST {} (timeout {}s)", url, timeout.as_secs()),
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    let value = match key {
        "trigger" => config.trigger.clone(),
        "formatstring" => config.formatstring.clone(),
        "filename" => config.filename.clone(),
        "posturl" => config.posturl.clone(),
        "sink" => describe_sink(&config.sink_config()),
        "timeout_secs" | "timeout-secs" => config.timeout_secs.to_string(),
        "log_level" | "log-level" => config.log_level.as_filter().to_string(),
        _ => bail!("Unknown config key: {}", key),
    };

    println!("{}", value);
    Ok(())
}
