use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsConfig {
    pub environment: Environment,
    pub markers: MarkerConfig,
    pub multivalued: MultivaluedConfig,
    pub watcher: WatcherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Prefix joined with a descriptor name to form its marker attribute
    pub attribute_prefix: String,
    pub multivalued: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultivaluedConfig {
    pub add_label: String,
    pub remove_label: String,
    /// Appended to the remove label of the last element, ahead of "Add"
    pub remove_separator: String,
    pub add_id_prefix: String,
    pub remove_id_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Upper bound on back-to-back batches delivered in one settle
    pub max_delivery_rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub debug_logging: bool,
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> String {
        match (&self.filter, self.debug_logging) {
            (Some(filter), _) => filter.clone(),
            (None, true) => "kc_login_fields=debug".to_string(),
            (None, false) => "kc_login_fields=info".to_string(),
        }
    }
}

impl FieldsConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Preset for the environment, then individual KC_FIELDS_* overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    /// Apply `KC_FIELDS_*` overrides looked up through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Marker overrides
        if let Some(v) = lookup("KC_FIELDS_MARKER_PREFIX") {
            self.markers.attribute_prefix = v;
        }
        if let Some(v) = lookup("KC_FIELDS_MULTIVALUED_MARKER") {
            self.markers.multivalued = v;
        }

        // Multivalued overrides
        if let Some(v) = lookup("KC_FIELDS_ADD_LABEL") {
            self.multivalued.add_label = v;
        }
        if let Some(v) = lookup("KC_FIELDS_REMOVE_LABEL") {
            self.multivalued.remove_label = v;
        }
        if let Some(v) = lookup("KC_FIELDS_REMOVE_SEPARATOR") {
            self.multivalued.remove_separator = v;
        }
        if let Some(v) = lookup("KC_FIELDS_ADD_ID_PREFIX") {
            self.multivalued.add_id_prefix = v;
        }
        if let Some(v) = lookup("KC_FIELDS_REMOVE_ID_PREFIX") {
            self.multivalued.remove_id_prefix = v;
        }

        // Watcher overrides
        if let Some(v) = lookup("KC_FIELDS_MAX_DELIVERY_ROUNDS") {
            self.watcher.max_delivery_rounds = v.parse().unwrap_or(self.watcher.max_delivery_rounds);
        }

        // Logging overrides
        if let Some(v) = lookup("KC_FIELDS_DEBUG_LOGGING") {
            self.logging.debug_logging = v.parse().unwrap_or(self.logging.debug_logging);
        }
        if let Some(v) = lookup("KC_FIELDS_LOG_FILTER") {
            self.logging.filter = Some(v).filter(|filter| !filter.trim().is_empty());
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            markers: MarkerConfig::default(),
            multivalued: MultivaluedConfig::default(),
            watcher: WatcherConfig {
                max_delivery_rounds: 64,
            },
            logging: LoggingConfig {
                debug_logging: true,
                filter: None,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            markers: MarkerConfig::default(),
            multivalued: MultivaluedConfig::default(),
            watcher: WatcherConfig {
                max_delivery_rounds: 32,
            },
            logging: LoggingConfig {
                debug_logging: false,
                filter: None,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            markers: MarkerConfig::default(),
            multivalued: MultivaluedConfig::default(),
            watcher: WatcherConfig {
                max_delivery_rounds: 16,
            },
            logging: LoggingConfig {
                debug_logging: false,
                filter: None,
            },
        }
    }
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            attribute_prefix: "data-".to_string(),
            multivalued: "data-kcMultivalued".to_string(),
        }
    }
}

impl Default for MultivaluedConfig {
    fn default() -> Self {
        Self {
            add_label: "Add value".to_string(),
            remove_label: "Remove".to_string(),
            remove_separator: " | ".to_string(),
            add_id_prefix: "kc-add-".to_string(),
            remove_id_prefix: "kc-remove-".to_string(),
        }
    }
}

// Global singleton config - initialized once on first use by the binary.
// Library entry points take a FieldsConfig explicitly.
pub static CONFIG: Lazy<FieldsConfig> = Lazy::new(FieldsConfig::from_env);

pub fn config() -> &'static FieldsConfig {
    &CONFIG
}
