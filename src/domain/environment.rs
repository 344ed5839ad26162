/// Environment variable Kubernetes injects into every pod.
pub const KUBERNETES_SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";

/// Returns `true` when the process runs inside a Kubernetes pod.
pub fn is_running_in_kubernetes() -> bool {
    std::env::var(KUBERNETES_SERVICE_HOST)
        .map(|host| !host.trim().is_empty())
        .unwrap_or(false)
}
