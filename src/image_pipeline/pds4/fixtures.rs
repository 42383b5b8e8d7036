//! Synthetic PDS4 products for tests

use std::fmt::Write as _;
use std::path::Path;

/// Offset of the data block in products written with an attached label
pub(crate) const ATTACHED_DATA_OFFSET: usize = 4096;

pub(crate) fn label_xml(
    file_name: &str,
    object: &str,
    offset: usize,
    data_type: &str,
    axes: &[(&str, usize)],
) -> String {
    let mut axis_xml = String::new();
    for (i, (name, elements)) in axes.iter().enumerate() {
        write!(
            axis_xml,
            "\n      <Axis_Array>\n        <axis_name>{}</axis_name>\n        <elements>{}</elements>\n        <sequence_number>{}</sequence_number>\n      </Axis_Array>",
            name,
            elements,
            i + 1
        )
        .unwrap();
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_Observational xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>urn:test:{file_name}</logical_identifier>
  </Identification_Area>
  <File_Area_Observational>
    <File>
      <file_name>{file_name}</file_name>
    </File>
    <{object}>
      <offset unit="byte">{offset}</offset>
      <axes>{count}</axes>
      <axis_index_order>Last Index Fastest</axis_index_order>
      <Element_Array>
        <data_type>{data_type}</data_type>
      </Element_Array>{axis_xml}
    </{object}>
  </File_Area_Observational>
</Product_Observational>
"#,
        count = axes.len()
    )
}

/// Big-endian 16-bit payload
pub(crate) fn u16_msb_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Writes a single-file product: label at the head, data at `ATTACHED_DATA_OFFSET`.
pub(crate) fn write_attached_u16(path: &Path, rows: usize, cols: usize, values: &[u16]) {
    assert_eq!(values.len(), rows * cols);
    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    let xml = label_xml(
        &file_name,
        "Array_2D_Image",
        ATTACHED_DATA_OFFSET,
        "UnsignedMSB2",
        &[("Line", rows), ("Sample", cols)],
    );

    let mut bytes = xml.into_bytes();
    assert!(bytes.len() <= ATTACHED_DATA_OFFSET);
    bytes.resize(ATTACHED_DATA_OFFSET, b' ');
    bytes.extend_from_slice(&u16_msb_bytes(values));
    std::fs::write(path, bytes).unwrap();
}

/// Writes a data file plus a sibling `.xml` label describing it.
pub(crate) fn write_detached(
    path: &Path,
    data_type: &str,
    axes: &[(&str, usize)],
    payload: &[u8],
) {
    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    let object = if axes.len() == 3 { "Array_3D_Image" } else { "Array_2D_Image" };
    let xml = label_xml(&file_name, object, 0, data_type, axes);
    std::fs::write(path.with_extension("xml"), xml).unwrap();
    std::fs::write(path, payload).unwrap();
}

/// Horizontal gradient covering the full 16-bit range.
pub(crate) fn gradient(rows: usize, cols: usize) -> Vec<u16> {
    (0..rows * cols)
        .map(|i| ((i % cols) * u16::MAX as usize / (cols - 1).max(1)) as u16)
        .collect()
}
