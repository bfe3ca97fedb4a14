//! Saves a few properties as a document with a side-file archive, then
//! restores them by type name.
//!
//! With a path argument, lists the entries of an encoded archive instead.

use std::fs;

use docprops::codec::{DocumentArchive, Writer, XmlReader};
use docprops::model::Color;
use docprops::property::{
    ColorListProperty, FloatListProperty, IntegerProperty, Property, StringListProperty,
    create_property,
};

fn dump(path: &str) {
    println!("Reading: {}", path);

    let data = fs::read(path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let archive = DocumentArchive::decode(&data).expect("Failed to decode");

    println!("\n=== Entries ({}) ===", archive.len());
    for (name, bytes) in archive.iter() {
        println!("  {}: {} bytes", name, bytes.len());
    }
}

fn demo() {
    let mut length = IntegerProperty::new();
    length.base_mut().set_name("Length");
    length.set_value(42);

    let mut weights = FloatListProperty::with_values(vec![0.5, 1.25, -3.0]);
    weights.base_mut().set_name("Weights");

    let mut colors =
        ColorListProperty::with_values(vec![Color::rgb(1.0, 0.0, 0.0), Color::WHITE]);
    colors.base_mut().set_name("Colors");

    let mut tags = StringListProperty::with_values(vec!["a<b".to_string(), "c".to_string()]);
    tags.base_mut().set_name("Tags");

    let props: [&dyn Property; 4] = [&length, &weights, &colors, &tags];

    let mut writer = Writer::new();
    writer.start_element("Properties", &[("Count", &props.len().to_string())]);
    for prop in props {
        writer.start_element("Property", &[("name", prop.name()), ("type", prop.type_name())]);
        prop.save(&mut writer).expect("Failed to save");
        writer.end_element("Property");
    }
    writer.end_element("Properties");
    let (text, files) = writer.into_parts();

    println!("=== Document ===");
    print!("{}", text);

    let archive = DocumentArchive::from_side_files(files);
    let bytes = archive.encode_compressed(3).expect("Failed to encode archive");
    println!("\n=== Archive ({} entries, {} bytes) ===", archive.len(), bytes.len());
    for name in archive.names() {
        println!("  {}", name);
    }

    // Restore everything from the text and the encoded archive
    let archive = DocumentArchive::decode(&bytes).expect("Failed to decode archive");
    let mut reader = XmlReader::new(&text).expect("Failed to parse document");
    reader.read_element("Properties").expect("Missing <Properties>");
    let count = reader.attribute_count("Count").expect("Missing Count");

    let mut restored: Vec<Box<dyn Property>> = Vec::with_capacity(count);
    for _ in 0..count {
        reader.read_element("Property").expect("Missing <Property>");
        let name = reader.attribute("name").expect("Missing name").to_string();
        let type_name = reader.attribute("type").expect("Missing type").to_string();

        let mut prop = create_property(&type_name).expect("Unknown property type");
        prop.base_mut().set_name(name);
        prop.restore(&mut reader).expect("Failed to restore");
        reader.read_end_element("Property").expect("Missing </Property>");
        restored.push(prop);
    }
    reader.read_end_element("Properties").expect("Missing </Properties>");

    let mut targets: Vec<&mut dyn Property> = restored
        .iter_mut()
        .map(|p| p.as_mut() as &mut dyn Property)
        .collect();
    archive
        .restore_pending(&mut reader, &mut targets)
        .expect("Failed to restore side-files");

    println!("\n=== Restored ===");
    for prop in &restored {
        println!("  {} ({}) = {}", prop.name(), prop.type_name(), prop.to_dynamic());
    }
}

fn main() {
    match std::env::args().nth(1) {
        Some(path) => dump(&path),
        None => demo(),
    }
}
