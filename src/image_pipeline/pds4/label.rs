//! Minimal PDS4 label reader.
//!
//! Only the parts of `File_Area_Observational` needed to locate and decode
//! the first array object are extracted; everything else in the label is
//! skipped. Parsing stops at the end of the root element so that attached
//! labels can be read straight from the head of a data file.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::pds4::types::{ArrayDescriptor, Axis, ElementType};

/// One `<File_Area_Observational>` of a label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileArea {
    /// `<File><file_name>` as written in the label
    pub file_name: Option<String>,
    /// First array object of the area, if it has one
    pub array: Option<ArrayDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pds4Label {
    pub file_areas: Vec<FileArea>,
}

impl Pds4Label {
    /// Picks the array describing `file_name`, falling back to the first
    /// array in the label when no file area names that file.
    pub fn array_for(&self, file_name: Option<&str>) -> Result<&ArrayDescriptor> {
        let named = file_name.and_then(|wanted| {
            self.file_areas.iter().find_map(|area| match (&area.file_name, &area.array) {
                (Some(name), Some(array)) if name.eq_ignore_ascii_case(wanted) => Some(array),
                _ => None,
            })
        });

        named
            .or_else(|| self.file_areas.iter().find_map(|area| area.array.as_ref()))
            .ok_or_else(|| ConversionError::DecodeError("label describes no array object".to_string()))
    }
}

#[derive(Default)]
struct ArrayBuilder {
    object_name: String,
    offset: Option<u64>,
    axes: Vec<Axis>,
    data_type: Option<String>,
    scaling_factor: Option<f64>,
    value_offset: Option<f64>,
}

impl ArrayBuilder {
    fn build(self) -> Result<ArrayDescriptor> {
        let data_type = self.data_type.ok_or_else(|| {
            ConversionError::DecodeError(format!("{} has no Element_Array data_type", self.object_name))
        })?;
        if self.axes.is_empty() {
            return Err(ConversionError::DecodeError(format!(
                "{} has no Axis_Array entries",
                self.object_name
            )));
        }
        let mut axes = self.axes;
        axes.sort_by_key(|axis| axis.sequence_number);

        Ok(ArrayDescriptor {
            object_name: self.object_name,
            offset: self.offset.unwrap_or(0),
            axes,
            element_type: ElementType::parse(&data_type)?,
            scaling_factor: self.scaling_factor,
            value_offset: self.value_offset,
        })
    }
}

#[derive(Default)]
struct AxisBuilder {
    name: String,
    elements: Option<usize>,
    sequence_number: Option<usize>,
}

impl AxisBuilder {
    fn build(self, position: usize) -> Result<Axis> {
        let elements = self.elements.ok_or_else(|| {
            ConversionError::DecodeError(format!("axis '{}' has no elements count", self.name))
        })?;
        Ok(Axis {
            name: self.name,
            elements,
            sequence_number: self.sequence_number.unwrap_or(position + 1),
        })
    }
}

fn is_array_object(name: &str) -> bool {
    name == "Array" || name.starts_with("Array_")
}

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn parse_number<T: std::str::FromStr>(field: &str, text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| ConversionError::DecodeError(format!("invalid {field} value '{text}'")))
}

/// Parses a PDS4 label. `xml` may carry arbitrary bytes after the root element.
pub fn parse_label(xml: &[u8]) -> Result<Pds4Label> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut label = Pds4Label::default();
    let mut area: Option<FileArea> = None;
    let mut array: Option<ArrayBuilder> = None;
    let mut axis: Option<AxisBuilder> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e);
                let parent = stack.last().map(String::as_str);

                if name == "File_Area_Observational" {
                    area = Some(FileArea::default());
                } else if is_array_object(&name)
                    && parent == Some("File_Area_Observational")
                    && area.as_ref().is_some_and(|a| a.array.is_none())
                    && array.is_none()
                {
                    array = Some(ArrayBuilder {
                        object_name: name.clone(),
                        ..Default::default()
                    });
                } else if name == "Axis_Array" && array.is_some() {
                    axis = Some(AxisBuilder::default());
                }

                seen_root = true;
                stack.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ConversionError::DecodeError(format!("label text: {err}")))?;
                let text = text.trim();
                let leaf = stack.last().map(String::as_str).unwrap_or("");
                let parent = stack
                    .len()
                    .checked_sub(2)
                    .map(|i| stack[i].as_str())
                    .unwrap_or("");

                if let Some(axis) = axis.as_mut() {
                    match leaf {
                        "axis_name" => axis.name = text.to_string(),
                        "elements" => axis.elements = Some(parse_number("elements", text)?),
                        "sequence_number" => {
                            axis.sequence_number = Some(parse_number("sequence_number", text)?)
                        }
                        _ => {}
                    }
                } else if let Some(array) = array.as_mut() {
                    match (parent, leaf) {
                        (_, "offset") if parent == array.object_name => {
                            array.offset = Some(parse_number("offset", text)?)
                        }
                        ("Element_Array", "data_type") => array.data_type = Some(text.to_string()),
                        ("Element_Array", "scaling_factor") => {
                            array.scaling_factor = Some(parse_number("scaling_factor", text)?)
                        }
                        ("Element_Array", "value_offset") => {
                            array.value_offset = Some(parse_number("value_offset", text)?)
                        }
                        _ => {}
                    }
                } else if let Some(area) = area.as_mut() {
                    if parent == "File" && leaf == "file_name" {
                        area.file_name = Some(text.to_string());
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.pop();

                if name == "Axis_Array" {
                    if let (Some(done), Some(array)) = (axis.take(), array.as_mut()) {
                        let position = array.axes.len();
                        array.axes.push(done.build(position)?);
                    }
                } else if array.as_ref().is_some_and(|a| a.object_name == name) && axis.is_none() {
                    if let (Some(done), Some(area)) = (array.take(), area.as_mut()) {
                        area.array = Some(done.build()?);
                    }
                } else if name == "File_Area_Observational" {
                    if let Some(done) = area.take() {
                        label.file_areas.push(done);
                    }
                }

                if seen_root && stack.is_empty() {
                    break;
                }
            }
            Ok(Event::Eof) => {
                if !seen_root {
                    return Err(ConversionError::DecodeError("label is empty".to_string()));
                }
                break;
            }
            Err(e) => {
                return Err(ConversionError::DecodeError(format!(
                    "label XML error at byte {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    debug!("Parsed PDS4 label with {} file area(s)", label.file_areas.len());
    Ok(label)
}
