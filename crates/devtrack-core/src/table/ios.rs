//! iOS device table.

use devtrack_proto::{ActionParams, DeviceDescriptor};

use super::{DeviceTable, RowSpec};
use crate::{dom::Document, link::build_link};

const STREAM: &str = "Stream";

/// Table of devices reported by the iOS tracker. Every row gets a QVH stream
/// link.
#[derive(Debug, Clone)]
pub struct IosTable {
    columns: Vec<RowSpec>,
}

impl IosTable {
    /// Channel of the iOS device list.
    pub const ACTION: &'static str = "appl-device-list";

    /// Table element id.
    pub const TABLE_ID: &'static str = "ios_device_list";

    /// Table with the standard columns.
    pub fn new() -> Self {
        Self {
            columns: vec![
                RowSpec::field("name", "Name"),
                RowSpec::field("udid", "UDID"),
                RowSpec::field("state", "State"),
                RowSpec::computed(STREAM),
            ],
        }
    }
}

impl Default for IosTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTable for IosTable {
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
        match (&column.field, column.title.as_str()) {
            (Some(field), _) => doc.set_text(cell, &device.display(field)),
            (None, STREAM) => {
                let params = ActionParams::QvhStream { udid: device.udid.clone() };
                let link = build_link(doc, &params, STREAM);
                doc.append_child(cell, link);
            },
            (None, _) => {},
        }
    }
}
