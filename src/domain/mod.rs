mod environment;
mod labels;
mod metrics;
mod normalizers;
mod options;
mod request;

// Publicly expose the Metrics abstraction
pub use self::metrics::{Metrics, MetricsPtr};

pub use environment::{is_running_in_kubernetes, KUBERNETES_SERVICE_HOST};
pub use labels::{
    RequestLabels, RequestSample, DEFAULT_LABELS, METHOD_LABEL, PATH_LABEL, STATUS_CODE_LABEL,
};
pub use normalizers::{
    normalize_method, normalize_path, normalize_status_code, replace_path_values,
    VALUE_PLACEHOLDER,
};
pub use options::{
    LabelValuesFn, MetricNames, MetricType, MetricsBackend, Normalizer, PromsterOptions, RecordOn,
    SkipFn, DEFAULT_CONTENT_LENGTH_BUCKETS, DEFAULT_DURATION_BUCKETS, DEFAULT_PERCENTILES,
};
pub use request::{NormalizeContext, RequestInfo, RequestStart};

pub(crate) use request::content_length;
