//! Deep-link action parameters.
//!
//! A device action is a plain link back to the current page with the
//! parameters encoded in the fragment, prefixed by [`FRAGMENT_PREFIX`]:
//!
//! ```text
//! https://host/index.html#!action=stream&udid=emulator-5554&decoder=mse&ip=10.0.0.2&port=8886
//! ```
//!
//! The encoding is `application/x-www-form-urlencoded`. Key order is fixed
//! on output but not required on input.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::{ProtocolError, Result};

/// Marker between `#` and the encoded parameters.
pub const FRAGMENT_PREFIX: &str = "#!";

/// Parameters of a video stream session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    /// Target device.
    pub udid: String,
    /// Client-side decoder name.
    pub decoder: String,
    /// Address of the device-side stream server.
    pub ip: String,
    /// Port of the device-side stream server.
    pub port: u16,
    /// Extra query passed through to the stream endpoint.
    pub query: Option<String>,
}

/// Parameter object of a device action link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParams {
    /// Video stream with remote control.
    Stream(StreamParams),
    /// Interactive shell.
    Shell {
        /// Target device.
        udid: String,
    },
    /// Remote web inspector.
    Devtools {
        /// Target device.
        udid: String,
    },
    /// QuickTime video hack stream (iOS).
    QvhStream {
        /// Target device.
        udid: String,
    },
}

impl ActionParams {
    /// Value of the `action` key.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Stream(_) => "stream",
            Self::Shell { .. } => "shell",
            Self::Devtools { .. } => "devtools",
            Self::QvhStream { .. } => "stream-qvh",
        }
    }

    /// Device the action targets.
    pub fn udid(&self) -> &str {
        match self {
            Self::Stream(params) => &params.udid,
            Self::Shell { udid } | Self::Devtools { udid } | Self::QvhStream { udid } => udid,
        }
    }

    /// Encode as a fragment body (without [`FRAGMENT_PREFIX`]).
    pub fn to_fragment(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("action", self.action());
        serializer.append_pair("udid", self.udid());

        if let Self::Stream(params) = self {
            serializer.append_pair("decoder", &params.decoder);
            serializer.append_pair("ip", &params.ip);
            serializer.append_pair("port", &params.port.to_string());
            if let Some(query) = &params.query {
                serializer.append_pair("query", query);
            }
        }

        serializer.finish()
    }

    /// Decode a fragment produced by [`Self::to_fragment`].
    ///
    /// Accepts the body with or without a leading `#` and `!`.
    pub fn from_fragment(fragment: &str) -> Result<Self> {
        let body = fragment.strip_prefix('#').unwrap_or(fragment);
        let body = body.strip_prefix('!').unwrap_or(body);

        let mut pairs: HashMap<String, String> =
            form_urlencoded::parse(body.as_bytes()).into_owned().collect();
        let mut take =
            |key: &'static str| pairs.remove(key).ok_or(ProtocolError::MissingParam(key));

        let action = take("action")?;
        let udid = take("udid")?;

        match action.as_str() {
            "stream" => {
                let decoder = take("decoder")?;
                let ip = take("ip")?;
                let port = take("port")?;
                let port = port.parse().map_err(|_| ProtocolError::InvalidPort(port))?;
                let query = take("query").ok();
                Ok(Self::Stream(StreamParams { udid, decoder, ip, port, query }))
            },
            "shell" => Ok(Self::Shell { udid }),
            "devtools" => Ok(Self::Devtools { udid }),
            "stream-qvh" => Ok(Self::QvhStream { udid }),
            _ => Err(ProtocolError::UnknownAction(action)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> ActionParams {
        ActionParams::Stream(StreamParams {
            udid: "emulator-5554".into(),
            decoder: "mse".into(),
            ip: "10.0.0.2".into(),
            port: 8886,
            query: None,
        })
    }

    #[test]
    fn stream_fragment_layout() {
        assert_eq!(
            stream().to_fragment(),
            "action=stream&udid=emulator-5554&decoder=mse&ip=10.0.0.2&port=8886"
        );
    }

    #[test]
    fn shell_fragment_layout() {
        let params = ActionParams::Shell { udid: "a b&c".into() };
        assert_eq!(params.to_fragment(), "action=shell&udid=a+b%26c");
    }

    #[test]
    fn decode_accepts_prefix_variants() {
        let body = stream().to_fragment();
        for input in [body.clone(), format!("#{body}"), format!("!{body}"), format!("#!{body}")] {
            assert_eq!(ActionParams::from_fragment(&input).unwrap(), stream());
        }
    }

    #[test]
    fn decode_ignores_key_order() {
        let params = ActionParams::from_fragment("udid=X&action=devtools").unwrap();
        assert_eq!(params, ActionParams::Devtools { udid: "X".into() });
    }

    #[test]
    fn decode_reports_missing_keys() {
        assert!(matches!(
            ActionParams::from_fragment("udid=X"),
            Err(ProtocolError::MissingParam("action"))
        ));
        assert!(matches!(
            ActionParams::from_fragment("action=stream&udid=X&decoder=mse&port=1"),
            Err(ProtocolError::MissingParam("ip"))
        ));
    }

    #[test]
    fn decode_reports_unknown_action() {
        assert!(matches!(
            ActionParams::from_fragment("action=reboot&udid=X"),
            Err(ProtocolError::UnknownAction(a)) if a == "reboot"
        ));
    }

    #[test]
    fn decode_reports_bad_port() {
        assert!(matches!(
            ActionParams::from_fragment("action=stream&udid=X&decoder=d&ip=h&port=99999"),
            Err(ProtocolError::InvalidPort(p)) if p == "99999"
        ));
    }
}
