//! Android device table.

use devtrack_proto::{ActionParams, DeviceDescriptor, StreamParams};

use super::{DeviceTable, RowSpec};
use crate::{dom::Document, link::build_link};

const STREAM: &str = "Stream";
const SHELL: &str = "Shell";
const DEVTOOLS: &str = "Devtools";

/// Table of devices reported by the Android (adb) tracker.
///
/// Action links are only offered for devices in the [`Self::ACTIVE_STATE`]
/// state. The stream link additionally needs the device `ip` attribute.
#[derive(Debug, Clone)]
pub struct DroidTable {
    columns: Vec<RowSpec>,
    decoder: String,
    stream_port: u16,
}

impl DroidTable {
    /// Channel of the Android device list.
    pub const ACTION: &'static str = "goog-device-list";

    /// Table element id.
    pub const TABLE_ID: &'static str = "droid_device_list";

    /// adb state of a device that accepts commands.
    pub const ACTIVE_STATE: &'static str = "device";

    /// Decoder requested by stream links unless overridden.
    pub const DEFAULT_DECODER: &'static str = "mse";

    /// Port of the on-device stream server unless overridden.
    pub const DEFAULT_STREAM_PORT: u16 = 8886;

    /// Table with default stream settings.
    pub fn new() -> Self {
        Self {
            columns: vec![
                RowSpec::field("ro.product.model", "Model"),
                RowSpec::field("udid", "Serial"),
                RowSpec::field("state", "State"),
                RowSpec::computed(STREAM),
                RowSpec::computed(SHELL),
                RowSpec::computed(DEVTOOLS),
            ],
            decoder: Self::DEFAULT_DECODER.to_owned(),
            stream_port: Self::DEFAULT_STREAM_PORT,
        }
    }

    /// Decoder named in stream links.
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl Into<String>) -> Self {
        self.decoder = decoder.into();
        self
    }

    /// Port named in stream links.
    #[must_use]
    pub fn with_stream_port(mut self, port: u16) -> Self {
        self.stream_port = port;
        self
    }

    fn action_params(&self, title: &str, device: &DeviceDescriptor) -> Option<ActionParams> {
        let udid = device.udid.clone();
        match title {
            STREAM => {
                let ip = device.display("ip");
                if ip.is_empty() {
                    return None;
                }
                Some(ActionParams::Stream(StreamParams {
                    udid,
                    decoder: self.decoder.clone(),
                    ip,
                    port: self.stream_port,
                    query: None,
                }))
            },
            SHELL => Some(ActionParams::Shell { udid }),
            DEVTOOLS => Some(ActionParams::Devtools { udid }),
            _ => None,
        }
    }
}

impl Default for DroidTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTable for DroidTable {
    fn action(&self) -> &str {
        Self::ACTION
    }

    fn columns(&self) -> &[RowSpec] {
        &self.columns
    }

    fn render_cell<D: Document>(
        &self,
        doc: &mut D,
        cell: D::Node,
        column: &RowSpec,
        device: &DeviceDescriptor,
    ) {
        if let Some(field) = &column.field {
            doc.set_text(cell, &device.display(field));
            return;
        }

        if device.state() != Some(Self::ACTIVE_STATE) {
            return;
        }
        if let Some(params) = self.action_params(&column.title, device) {
            let link = build_link(doc, &params, &column.title);
            doc.append_child(cell, link);
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::{dom::MemoryDocument, table::TableRegistry};

    fn render(devices: &[DeviceDescriptor]) -> MemoryDocument {
        let mut doc = MemoryDocument::new(Url::parse("http://localhost:8000/").unwrap());
        let handle = TableRegistry::new().claim(DroidTable::TABLE_ID).unwrap();
        DroidTable::new().build_device_table(&mut doc, &handle, devices);
        doc
    }

    fn row_links(doc: &MemoryDocument) -> Vec<Vec<String>> {
        let table = doc.element_by_id(DroidTable::TABLE_ID).unwrap();
        let body = doc.first_child_by_tag(table, "tbody").unwrap();
        doc.children(body)
            .into_iter()
            .map(|row| {
                doc.children(row)
                    .into_iter()
                    .filter_map(|cell| doc.first_child_by_tag(cell, "a"))
                    .filter_map(|a| doc.attribute(a, "href"))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn active_device_gets_all_links() {
        let device = DeviceDescriptor::new("emulator-5554")
            .with_field("state", "device")
            .with_field("ro.product.model", "Pixel 7")
            .with_field("ip", "10.0.2.15");

        let links = row_links(&render(&[device]));
        assert_eq!(
            links,
            vec![vec![
                "http://localhost:8000/#!action=stream&udid=emulator-5554&decoder=mse\
                 &ip=10.0.2.15&port=8886"
                    .to_owned(),
                "http://localhost:8000/#!action=shell&udid=emulator-5554".to_owned(),
                "http://localhost:8000/#!action=devtools&udid=emulator-5554".to_owned(),
            ]]
        );
    }

    #[test]
    fn stream_link_needs_ip() {
        let device = DeviceDescriptor::new("A").with_field("state", "device");
        let links = row_links(&render(&[device]));
        assert_eq!(links[0].len(), 2);
        assert!(links[0].iter().all(|href| !href.contains("action=stream")));
    }

    #[test]
    fn inactive_device_gets_no_links() {
        let device = DeviceDescriptor::new("A").with_field("state", "unauthorized");
        let doc = render(&[device]);
        assert_eq!(row_links(&doc), vec![Vec::<String>::new()]);

        let table = doc.element_by_id(DroidTable::TABLE_ID).unwrap();
        let body = doc.first_child_by_tag(table, "tbody").unwrap();
        assert_eq!(doc.text_content(body), "Aunauthorized");
    }

    #[test]
    fn custom_stream_settings_are_used() {
        let table = DroidTable::new().with_decoder("broadway").with_stream_port(9000);
        let device = DeviceDescriptor::new("A").with_field("state", "device").with_field("ip", "h");
        let params = table.action_params(STREAM, &device);
        assert_eq!(
            params,
            Some(ActionParams::Stream(StreamParams {
                udid: "A".into(),
                decoder: "broadway".into(),
                ip: "h".into(),
                port: 9000,
                query: None,
            }))
        );
    }
}
