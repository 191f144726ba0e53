//! Register source cluster into destination cluster.
//!
//! ```bash
//! kubectl-register --source-context kind-k8ssandra-1 --dest-context kind-k8ssandra-0
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{error, info};

use fluvio_future::task::run_block_on;
use k8_config::KubeConfig;
use k8_register::{
    default_destination_name, ConnectionTarget, RegistrationConfig, RegistrationExecutor,
};

const DEFAULT_NAMESPACE: &str = "k8ssandra-operator";

#[derive(Parser, Debug)]
#[command(name = "kubectl-register")]
#[command(about = "Register a cluster's credentials into another cluster", long_about = None)]
#[command(version)]
struct Cli {
    /// kubeconfig of source cluster, defaults to $KUBECONFIG or ~/.kube/config
    #[arg(long)]
    source_kubeconfig: Option<PathBuf>,

    /// kubeconfig of destination cluster, defaults to $KUBECONFIG or ~/.kube/config
    #[arg(long)]
    dest_kubeconfig: Option<PathBuf>,

    #[arg(long, env = "SOURCE_CONTEXT")]
    source_context: String,

    #[arg(long, env = "DEST_CONTEXT")]
    dest_context: String,

    /// namespace where service account is created
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    source_namespace: String,

    /// namespace where kubeconfig secret and client config are published
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    dest_namespace: String,

    #[arg(long = "serviceaccount", default_value = "k8ssandra-operator")]
    service_account: String,

    /// defaults to source context
    #[arg(long)]
    dest_name: Option<String>,

    /// overall timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// delay between attempts in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_interval: u64,
}

impl Cli {
    fn into_config(self) -> Result<(RegistrationConfig, Duration)> {
        let source_kubeconfig = match self.source_kubeconfig {
            Some(path) => path,
            None => KubeConfig::default_path()?,
        };
        let dest_kubeconfig = match self.dest_kubeconfig {
            Some(path) => path,
            None => KubeConfig::default_path()?,
        };

        let destination_name = self
            .dest_name
            .unwrap_or_else(|| default_destination_name(&self.source_context));
        if destination_name.is_empty() {
            return Err(anyhow!("--dest-name is required, source context has no usable name"));
        }

        let config = RegistrationConfig {
            source: ConnectionTarget::new(source_kubeconfig, self.source_context),
            dest: ConnectionTarget::new(dest_kubeconfig, self.dest_context),
            source_namespace: self.source_namespace,
            dest_namespace: self.dest_namespace,
            service_account: self.service_account,
            destination_name,
            deadline: Some(Instant::now() + Duration::from_secs(self.timeout)),
        };
        Ok((config, Duration::from_millis(self.poll_interval)))
    }
}

fn main() -> ExitCode {
    fluvio_future::subscriber::init_tracer(None);

    let cli = Cli::parse();
    let (config, interval) = match cli.into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid arguments: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        source = %config.source,
        dest = %config.dest,
        name = %config.destination_name,
        "registering cluster"
    );
    let executor = RegistrationExecutor::new(config);
    match run_block_on(executor.poll(interval)) {
        Ok(()) => {
            println!("cluster registered");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            eprintln!("registration failed: {err}");
            ExitCode::FAILURE
        }
    }
}
