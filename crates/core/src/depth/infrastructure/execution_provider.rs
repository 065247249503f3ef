use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};

/// Execution providers for the depth session, most preferred first.
///
/// The platform accelerator (CoreML, DirectML) is tried first; ONNX Runtime
/// moves on to the CPU provider when it is unavailable.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    let mut providers = Vec::new();
    #[cfg(target_os = "macos")]
    providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
    #[cfg(target_os = "windows")]
    providers.push(ort::execution_providers::DirectMLExecutionProvider::default().build());
    providers.push(CPUExecutionProvider::default().build());
    providers
}

/// Human-readable accelerator label for startup logging.
pub fn accelerator_label() -> &'static str {
    if cfg!(target_os = "macos") {
        "CoreML"
    } else if cfg!(target_os = "windows") {
        "DirectML"
    } else {
        "CPU"
    }
}
