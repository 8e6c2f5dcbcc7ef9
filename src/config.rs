use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_PATH: &str = "battery_charge_predictor.pt";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model_path: PathBuf,
    pub meta_path: PathBuf,
    pub port: u16,
    pub intra_op_threads: i32,
    pub log_pred: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let model_path = PathBuf::from(
            get("MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
        );
        // Sidecar defaults to the model path with a .json extension.
        let meta_path = get("META_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| model_path.with_extension("json"));

        let port = match get("PORT") {
            Some(s) => s.parse().with_context(|| format!("invalid PORT {s:?}"))?,
            None => 8080,
        };
        let intra_op_threads = match get("INTRA_OP_THREADS") {
            Some(s) => s
                .parse()
                .with_context(|| format!("invalid INTRA_OP_THREADS {s:?}"))?,
            None => 1,
        };
        let log_pred = get("LOG_PRED").as_deref() == Some("1");

        Ok(Self {
            model_path,
            meta_path,
            port,
            intra_op_threads,
            log_pred,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("battery_charge_predictor.pt"));
        assert_eq!(cfg.meta_path, PathBuf::from("battery_charge_predictor.json"));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.intra_op_threads, 1);
        assert!(!cfg.log_pred);
    }

    #[test]
    fn overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("MODEL_PATH", "/models/eta.pt"),
            ("META_PATH", "/models/meta.json"),
            ("PORT", "9000"),
            ("INTRA_OP_THREADS", "4"),
            ("LOG_PRED", "1"),
        ]))
        .unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("/models/eta.pt"));
        assert_eq!(cfg.meta_path, PathBuf::from("/models/meta.json"));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.intra_op_threads, 4);
        assert!(cfg.log_pred);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("invalid PORT"));
    }
}
