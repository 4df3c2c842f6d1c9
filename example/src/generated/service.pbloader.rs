// Code generated by protoenv. DO NOT EDIT.
// source: service.proto

pub mod service_config {
    use super::*;
    #[allow(unused_imports)]
    use protoenv::{env, LoadError, LoadFromEnv};

    impl LoadFromEnv for Service {
        /// Loads the data from env vars and defaults, making sure all values are initialized.
        fn load_from_env(&mut self, prefix: &str, defaults: Option<&Service>) -> Result<(), LoadError> {
            let key = format!("{prefix}NAME");
            if let Some(val) = env::get_string_env(&key) {
                self.name = val;
            } else if self.name.is_empty() {
                if let Some(d) = defaults {
                    if !d.name.is_empty() {
                        self.name = d.name.clone();
                    }
                }
            }

            let key = format!("{prefix}TIMEOUT");
            if let Some(val) = env::get_i32_env(&key) {
                self.timeout = Some(val);
            } else if self.timeout.is_none() {
                self.timeout = Some(defaults.and_then(|d| d.timeout).unwrap_or_default());
            }

            let key = format!("{prefix}TAGS");
            if let Some(vals) = env::get_array_string_env(&key) {
                self.tags = vals
                    .iter()
                    .map(|val| env::resolve_enum(&key, val, Color::from_str_name).map(|v| v as i32))
                    .collect::<Result<Vec<_>, LoadError>>()?;
            } else if self.tags.is_empty() {
                if let Some(d) = defaults {
                    if !d.tags.is_empty() {
                        self.tags = d.tags.clone();
                    }
                }
            }

            if let Some(d) = defaults {
                for (k, v) in &d.opts {
                    self.opts.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }

            self.reporting
                .get_or_insert_with(Default::default)
                .load_from_env(&format!("{prefix}REPORTING_"), defaults.and_then(|d| d.reporting.as_ref()))?;

            let key = format!("{prefix}ACCENT");
            if let Some(val) = env::get_string_env(&key) {
                self.accent = env::resolve_enum(&key, &val, Color::from_str_name)? as i32;
            } else if self.accent == 0 {
                if let Some(d) = defaults {
                    if d.accent != 0 {
                        self.accent = d.accent;
                    }
                }
            }
            Ok(())
        }
    }

    impl Service {
        /// Merges `values` into `opts`, overwriting existing keys.
        pub fn put_all_opts(&mut self, values: ::std::collections::HashMap<String, String>) {
            self.opts.extend(values);
        }
    }

    impl LoadFromEnv for Reporting {
        /// Loads the data from env vars and defaults, making sure all values are initialized.
        fn load_from_env(&mut self, prefix: &str, defaults: Option<&Reporting>) -> Result<(), LoadError> {
            let key = format!("{prefix}ENDPOINT");
            if let Some(val) = env::get_string_env(&key) {
                self.endpoint = val;
            } else if self.endpoint.is_empty() {
                if let Some(d) = defaults {
                    if !d.endpoint.is_empty() {
                        self.endpoint = d.endpoint.clone();
                    }
                }
            }

            let key = format!("{prefix}PORT");
            if let Some(val) = env::get_u32_env(&key) {
                self.port = Some(val);
            } else if self.port.is_none() {
                self.port = Some(defaults.and_then(|d| d.port).unwrap_or_default());
            }

            let key = format!("{prefix}SECURE");
            if let Some(val) = env::get_bool_env(&key) {
                self.secure = val;
            } else if !self.secure {
                if let Some(d) = defaults {
                    if d.secure {
                        self.secure = d.secure;
                    }
                }
            }

            let key = format!("{prefix}SAMPLE_RATIO");
            if let Some(val) = env::get_f64_env(&key) {
                self.sample_ratio = val;
            } else if self.sample_ratio == 0.0 {
                if let Some(d) = defaults {
                    if d.sample_ratio != 0.0 {
                        self.sample_ratio = d.sample_ratio;
                    }
                }
            }
            Ok(())
        }
    }
}
