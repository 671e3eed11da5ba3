// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Server configuration.

use derivative::Derivative;
use std::net::{Ipv4Addr, SocketAddr};
use transit_core::env::get_optional_var;

/// Port to listen on when none is configured.
const DEFAULT_PORT: u16 = 3000;

/// Settings of the HTTP server.
#[derive(Derivative)]
#[derivative(Debug, PartialEq)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,

    /// Whether to listen on all interfaces instead of on localhost only.
    pub bind_all: bool,

    /// Token that clients must present as bearer authentication, if any.
    #[derivative(Debug = "ignore")]
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, bind_all: false, api_token: None }
    }
}

impl Config {
    /// Initializes the configuration from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use the optional variables `<prefix>_PORT`, `<prefix>_BIND_ALL` and
    /// `<prefix>_API_TOKEN`.
    pub fn from_env(prefix: &str) -> Result<Config, String> {
        let api_token = match get_optional_var::<String>(prefix, "API_TOKEN")? {
            Some(token) if token.is_empty() => {
                return Err(format!("{}_API_TOKEN cannot be empty", prefix));
            }
            token => token,
        };
        Ok(Config {
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT),
            bind_all: get_optional_var::<bool>(prefix, "BIND_ALL")?.unwrap_or(false),
            api_token,
        })
    }

    /// Computes the address to listen on.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = if self.bind_all { Ipv4Addr::UNSPECIFIED } else { Ipv4Addr::LOCALHOST };
        SocketAddr::from((ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("TRANSIT_PORT", None::<&str>),
                ("TRANSIT_BIND_ALL", None),
                ("TRANSIT_API_TOKEN", None),
            ],
            || {
                let config = Config::from_env("TRANSIT").unwrap();
                assert_eq!(Config::default(), config);
                assert_eq!("127.0.0.1:3000".parse::<SocketAddr>().unwrap(), config.bind_addr());
            },
        );
    }

    #[test]
    fn test_from_env_all_present() {
        temp_env::with_vars(
            [
                ("TRANSIT_PORT", Some("8080")),
                ("TRANSIT_BIND_ALL", Some("true")),
                ("TRANSIT_API_TOKEN", Some("the-token")),
            ],
            || {
                let config = Config::from_env("TRANSIT").unwrap();
                assert_eq!(
                    Config { port: 8080, bind_all: true, api_token: Some("the-token".to_owned()) },
                    config
                );
                assert_eq!("0.0.0.0:8080".parse::<SocketAddr>().unwrap(), config.bind_addr());
            },
        );
    }

    #[test]
    fn test_from_env_bad_values() {
        temp_env::with_vars([("TRANSIT_PORT", Some("http")), ("TRANSIT_BIND_ALL", None)], || {
            let err = Config::from_env("TRANSIT").unwrap_err();
            assert!(err.contains("TRANSIT_PORT"));
        });

        temp_env::with_vars([("TRANSIT_PORT", None), ("TRANSIT_BIND_ALL", Some("yes"))], || {
            let err = Config::from_env("TRANSIT").unwrap_err();
            assert!(err.contains("TRANSIT_BIND_ALL"));
        });

        temp_env::with_var("TRANSIT_API_TOKEN", Some(""), || {
            assert_eq!(
                "TRANSIT_API_TOKEN cannot be empty",
                Config::from_env("TRANSIT").unwrap_err()
            );
        });
    }

    #[test]
    fn test_debug_hides_token() {
        let config = Config { port: 1, bind_all: false, api_token: Some("secret".to_owned()) };
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
