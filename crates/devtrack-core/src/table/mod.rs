//! Device table reconciliation.
//!
//! Every tracker draws into one table inside a shared holder element:
//!
//! ```text
//! <div id="devices" class="table-wrapper">
//!   <table id="{table_id}" width="100%">
//!     <thead><tr><th class="{lower(title)}">{title}</th>...</tr></thead>
//!     <tbody><tr><td class="{lower(title)}">...</td>...</tr>...</tbody>
//!   </table>
//! </div>
//! ```
//!
//! Holder and table are created on first render and reused afterwards. On
//! every render the body is emptied and refilled from the collection; rows
//! are not diffed.

mod droid;
mod ios;

use std::collections::HashSet;

use devtrack_proto::DeviceDescriptor;
use tracing::trace;

pub use self::{droid::DroidTable, ios::IosTable};
use crate::{dom::Document, error::TrackerError};

/// `id` of the element holding all device tables.
pub const CONTAINER_ID: &str = "devices";

/// `class` of the holder element.
pub const CONTAINER_CLASS: &str = "table-wrapper";

/// One table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    /// Descriptor attribute shown in the column, if it maps to one.
    pub field: Option<String>,
    /// Header text.
    pub title: String,
}

impl RowSpec {
    /// Column bound to a descriptor attribute.
    pub fn field(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self { field: Some(field.into()), title: title.into() }
    }

    /// Column without a backing attribute (actions, computed values).
    pub fn computed(title: impl Into<String>) -> Self {
        Self { field: None, title: title.into() }
    }

    /// Class name used for header and body cells.
    pub fn class_name(&self) -> String {
        self.title.to_lowercase()
    }
}

/// Where a tracker draws its table.
///
/// Obtained from [`TableRegistry::claim`], which guarantees one tracker per
/// table id.
#[derive(Debug, PartialEq, Eq)]
pub struct TableHandle {
    container_id: String,
    table_id: String,
}

impl TableHandle {
    /// `id` of the holder element.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// `id` of the table element.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }
}

/// Hands out table ids, at most one handle per id.
#[derive(Debug, Default)]
pub struct TableRegistry {
    claimed: HashSet<String>,
}

impl TableRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `table_id` inside the shared holder.
    pub fn claim(&mut self, table_id: &str) -> Result<TableHandle, TrackerError> {
        if !self.claimed.insert(table_id.to_owned()) {
            return Err(TrackerError::DuplicateTable { table_id: table_id.to_owned() });
        }
        Ok(TableHandle { container_id: CONTAINER_ID.to_owned(), table_id: table_id.to_owned() })
    }

    /// Give a table id back.
    pub fn release(&mut self, handle: TableHandle) {
        self.claimed.remove(&handle.table_id);
    }

    /// Whether `table_id` is currently claimed.
    pub fn is_claimed(&self, table_id: &str) -> bool {
        self.claimed.contains(table_id)
    }
}

/// Rendering hook for one device type.
///
/// Implementors choose the channel, the columns and the content of each cell.
/// Table structure and redraw policy come from the provided methods.
pub trait DeviceTable {
    /// Server-side action (channel) whose devices this table shows.
    fn action(&self) -> &str;

    /// Columns, in display order.
    fn columns(&self) -> &[RowSpec];

    /// Fill `cell` for `device` in `column`.
    fn render_cell<D: Document>(
        &self,
        doc: &mut D,
        cell: D::Node,
        column: &RowSpec,
        device: &DeviceDescriptor,
    );

    /// Build one body row.
    fn render_row<D: Document>(&self, doc: &mut D, device: &DeviceDescriptor) -> D::Node {
        let row = doc.create_element("tr");
        for column in self.columns() {
            let cell = doc.create_element("td");
            doc.set_class(cell, &column.class_name());
            self.render_cell(doc, cell, column, device);
            doc.append_child(row, cell);
        }
        row
    }

    /// Redraw the table so it shows exactly `devices`, in order.
    fn build_device_table<D: Document>(
        &self,
        doc: &mut D,
        handle: &TableHandle,
        devices: &[DeviceDescriptor],
    ) {
        let holder = get_or_create_holder(doc, handle);
        let body = get_or_build_table_body(doc, handle, holder, self.columns());
        for device in devices {
            let row = self.render_row(doc, device);
            doc.append_child(body, row);
        }
        trace!(table_id = handle.table_id(), rows = devices.len(), "device table rendered");
    }
}

/// Find the holder element, creating it under `<body>` if absent.
pub fn get_or_create_holder<D: Document>(doc: &mut D, handle: &TableHandle) -> D::Node {
    if let Some(holder) = doc.element_by_id(handle.container_id()) {
        return holder;
    }

    let holder = doc.create_element("div");
    doc.set_id(holder, handle.container_id());
    doc.set_class(holder, CONTAINER_CLASS);
    let body = doc.body();
    doc.append_child(body, holder);
    holder
}

/// Find the table body and empty it, or build the table with its header.
pub fn get_or_build_table_body<D: Document>(
    doc: &mut D,
    handle: &TableHandle,
    holder: D::Node,
    columns: &[RowSpec],
) -> D::Node {
    // Only tables inside the holder count; a stray element elsewhere with
    // the same id must not cause a rebuild.
    let existing = doc
        .children(holder)
        .into_iter()
        .find(|table| {
            doc.tag_name(*table) == "table"
                && doc.attribute(*table, "id").as_deref() == Some(handle.table_id())
        })
        .and_then(|table| doc.first_child_by_tag(table, "tbody"));

    if let Some(body) = existing {
        doc.clear_children(body);
        return body;
    }

    let table = doc.create_element("table");
    let head = doc.create_element("thead");
    let head_row = doc.create_element("tr");
    for column in columns {
        let th = doc.create_element("th");
        doc.set_text(th, &column.title);
        doc.set_class(th, &column.class_name());
        doc.append_child(head_row, th);
    }
    doc.append_child(head, head_row);
    doc.append_child(table, head);

    let body = doc.create_element("tbody");
    doc.set_id(table, handle.table_id());
    doc.append_child(table, body);
    doc.set_attribute(table, "width", "100%");
    doc.append_child(holder, table);
    body
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::dom::MemoryDocument;

    struct PlainTable {
        columns: Vec<RowSpec>,
    }

    impl PlainTable {
        fn new() -> Self {
            Self { columns: vec![RowSpec::field("udid", "UDID"), RowSpec::field("name", "Name")] }
        }
    }

    impl DeviceTable for PlainTable {
        fn action(&self) -> &str {
            "plain"
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
            let text = column.field.as_deref().map(|f| device.display(f)).unwrap_or_default();
            doc.set_text(cell, &text);
        }
    }

    fn document() -> MemoryDocument {
        MemoryDocument::new(Url::parse("http://localhost/").unwrap())
    }

    fn handle() -> TableHandle {
        TableRegistry::new().claim("plain_list").unwrap()
    }

    fn body_rows(doc: &MemoryDocument) -> Vec<String> {
        let table = doc.element_by_id("plain_list").unwrap();
        let body = doc.first_child_by_tag(table, "tbody").unwrap();
        doc.children(body).into_iter().map(|row| doc.text_content(row)).collect()
    }

    #[test]
    fn class_name_is_lowercased_title() {
        assert_eq!(RowSpec::computed("Stream").class_name(), "stream");
        assert_eq!(RowSpec::field("udid", "UDID").class_name(), "udid");
    }

    #[test]
    fn registry_rejects_duplicate_ids() {
        let mut registry = TableRegistry::new();
        let handle = registry.claim("droid_device_list").unwrap();
        assert_eq!(
            registry.claim("droid_device_list"),
            Err(TrackerError::DuplicateTable { table_id: "droid_device_list".into() })
        );

        registry.release(handle);
        assert!(!registry.is_claimed("droid_device_list"));
        assert!(registry.claim("droid_device_list").is_ok());
    }

    #[test]
    fn first_render_builds_structure() {
        let mut doc = document();
        let devices = vec![DeviceDescriptor::new("A").with_field("name", "pixel")];
        PlainTable::new().build_device_table(&mut doc, &handle(), &devices);

        let holder = doc.element_by_id(CONTAINER_ID).unwrap();
        assert_eq!(doc.attribute(holder, "class").as_deref(), Some(CONTAINER_CLASS));
        assert_eq!(
            doc.outer_html(holder),
            "<div id=\"devices\" class=\"table-wrapper\"><table id=\"plain_list\" width=\"100%\">\
             <thead><tr><th class=\"udid\">UDID</th><th class=\"name\">Name</th></tr></thead>\
             <tbody><tr><td class=\"udid\">A</td><td class=\"name\">pixel</td></tr></tbody>\
             </table></div>"
        );
    }

    #[test]
    fn rerender_reuses_table_and_replaces_rows() {
        let mut doc = document();
        let handle = handle();
        let table = PlainTable::new();

        table.build_device_table(&mut doc, &handle, &[DeviceDescriptor::new("A")]);
        let first_table = doc.element_by_id("plain_list");
        table.build_device_table(
            &mut doc,
            &handle,
            &[DeviceDescriptor::new("B"), DeviceDescriptor::new("C")],
        );

        assert_eq!(doc.element_by_id("plain_list"), first_table);
        assert_eq!(doc.children(doc.body()).len(), 1);
        assert_eq!(body_rows(&doc), ["B", "C"]);

        let table_node = doc.element_by_id("plain_list").unwrap();
        let head = doc.first_child_by_tag(table_node, "thead").unwrap();
        assert_eq!(doc.children(head).len(), 1);
    }

    #[test]
    fn empty_collection_leaves_empty_body() {
        let mut doc = document();
        let handle = handle();
        let table = PlainTable::new();
        table.build_device_table(&mut doc, &handle, &[DeviceDescriptor::new("A")]);
        table.build_device_table(&mut doc, &handle, &[]);

        assert!(body_rows(&doc).is_empty());
    }

    #[test]
    fn stray_element_with_table_id_is_ignored() {
        let mut doc = document();
        let stray = doc.create_element("table");
        doc.set_id(stray, "plain_list");
        let body = doc.body();
        doc.append_child(body, stray);

        let handle = handle();
        let table = PlainTable::new();
        table.build_device_table(&mut doc, &handle, &[DeviceDescriptor::new("A")]);
        table.build_device_table(&mut doc, &handle, &[DeviceDescriptor::new("B")]);

        let holder = doc.element_by_id(CONTAINER_ID).unwrap();
        let tables = doc.children(holder);
        assert_eq!(tables.len(), 1);

        let rows_body = doc.first_child_by_tag(tables[0], "tbody").unwrap();
        let rows: Vec<String> =
            doc.children(rows_body).into_iter().map(|row| doc.text_content(row)).collect();
        assert_eq!(rows, ["B"]);
        assert!(doc.children(stray).is_empty());
    }

    #[test]
    fn redraw_does_not_leak_nodes() {
        let mut doc = document();
        let handle = handle();
        let table = PlainTable::new();
        let devices = vec![DeviceDescriptor::new("A"), DeviceDescriptor::new("B")];

        table.build_device_table(&mut doc, &handle, &devices);
        let after_first = doc.live_nodes();
        for _ in 0..10 {
            table.build_device_table(&mut doc, &handle, &devices);
        }
        assert_eq!(doc.live_nodes(), after_first);
    }
}
