use k8_config::KubeConfig;

fn main() {
    // Read the KUBECONFIG env var for a path, or attempt to open $HOME/.kube/config
    // then resolve context given as first argument or current context

    fluvio_future::subscriber::init_tracer(None);
    let config = KubeConfig::from_env_or_home().expect("Load failed");

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.current_context.clone());

    let resolved = config.resolve(&name).expect("context");
    println!("context: {}", resolved.name);
    println!("namespace: {}", resolved.namespace);
    println!("server: {}", resolved.cluster.server);
}
