// CSV import/export for registry extracts and result tables

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use biodex_dedup::model::{CanonicalOperator, MappingRow, PlantRecord};

use crate::error::IoError;

/// A registry extract decoded to UTF-8, with its sniffed field delimiter.
#[derive(Debug)]
pub struct DecodedTable {
    pub content: String,
    pub delimiter: u8,
}

/// Read and decode an extract file. MaStR exports arrive as UTF-8 or
/// Excel-flavored Windows-1252, with semicolon or comma fields.
pub fn read_table(path: &Path) -> Result<DecodedTable, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    Ok(DecodedTable { content, delimiter })
}

pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across
/// the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per
/// line. The delimiter that produces the most consistent field count
/// (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let first = counts[0];
        let consistent = counts.iter().filter(|&&c| c == first).count() as u64;
        let score = consistent * first as u64;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// One row per canonical operator. Member ids are joined for manual
/// audit, as in the registry's consolidated exports.
pub fn write_operator_table(path: &Path, operators: &[CanonicalOperator]) -> Result<(), IoError> {
    let mut writer = writer_for(path)?;

    write_record(
        &mut writer,
        &["canonical_id", "name", "email", "phone", "website", "member_count", "member_ids"],
    )?;
    for op in operators {
        let member_count = op.member_count.to_string();
        let member_ids = op.member_ids.join("; ");
        write_record(
            &mut writer,
            &[
                op.canonical_id.as_str(),
                op.name.as_str(),
                op.email.as_deref().unwrap_or(""),
                op.phone.as_deref().unwrap_or(""),
                op.website.as_deref().unwrap_or(""),
                member_count.as_str(),
                member_ids.as_str(),
            ],
        )?;
    }

    finish(writer, path)
}

/// The audit trail: one row per original raw id.
pub fn write_mapping_table(path: &Path, mapping: &[MappingRow]) -> Result<(), IoError> {
    let mut writer = writer_for(path)?;

    write_record(&mut writer, &["raw_id", "canonical_id"])?;
    for row in mapping {
        write_record(&mut writer, &[row.raw_id.as_str(), row.canonical_id.as_str()])?;
    }

    finish(writer, path)
}

/// Re-keyed plant table. Technical columns pass through in stable
/// (sorted) order; the canonical operator's name and contacts are joined
/// on at the end so the table is usable without a second lookup.
pub fn write_plant_table(
    path: &Path,
    plants: &[PlantRecord],
    operators: &HashMap<&str, &CanonicalOperator>,
) -> Result<(), IoError> {
    let technical: BTreeSet<&str> = plants
        .iter()
        .flat_map(|p| p.raw_fields.keys().map(String::as_str))
        .collect();

    let mut writer = writer_for(path)?;

    let mut header: Vec<&str> = vec!["plant_id", "operator_id"];
    header.extend(technical.iter().copied());
    header.extend(["operator_name", "operator_email", "operator_phone", "operator_website"]);
    write_record(&mut writer, &header)?;

    for plant in plants {
        let operator = plant
            .operator_id
            .as_deref()
            .and_then(|id| operators.get(id).copied());

        let mut fields: Vec<&str> = Vec::with_capacity(header.len());
        fields.push(&plant.plant_id);
        fields.push(plant.operator_id.as_deref().unwrap_or(""));
        for column in &technical {
            fields.push(plant.raw_fields.get(*column).map(String::as_str).unwrap_or(""));
        }
        fields.push(operator.map(|op| op.name.as_str()).unwrap_or(""));
        fields.push(operator.and_then(|op| op.email.as_deref()).unwrap_or(""));
        fields.push(operator.and_then(|op| op.phone.as_deref()).unwrap_or(""));
        fields.push(operator.and_then(|op| op.website.as_deref()).unwrap_or(""));
        write_record(&mut writer, &fields)?;
    }

    finish(writer, path)
}

fn writer_for(path: &Path) -> Result<csv::Writer<std::fs::File>, IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(csv::WriterBuilder::new().from_writer(file))
}

fn write_record<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    fields: &[&str],
) -> Result<(), IoError> {
    writer
        .write_record(fields)
        .map_err(|e| IoError::Csv(e.to_string()))
}

fn finish(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<(), IoError> {
    writer.flush().map_err(|e| IoError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator(canonical_id: &str, email: Option<&str>) -> CanonicalOperator {
        CanonicalOperator {
            canonical_id: canonical_id.into(),
            name: "Bioenergie Husum GmbH".into(),
            email: email.map(String::from),
            phone: None,
            website: None,
            member_count: 2,
            member_ids: vec![canonical_id.into(), format!("{canonical_id}-b")],
        }
    }

    #[test]
    fn sniff_semicolon_extract() {
        let content = "MastrNummer;Firmenname;Email\nABR1;Agrar Nord GbR;a@x.de\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_comma_default() {
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
    }

    #[test]
    fn sniff_prefers_consistent_candidate() {
        // Commas appear once; semicolons split every line the same way
        let content = "id;name;ort\n1;Meier, Hans;Husum\n2;Petersen;Flensburg\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn decode_windows_1252_extract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actors.csv");
        // 0xFC is ü in Windows-1252
        let bytes = b"MastrNummer;Firmenname\nABR1;M\xFCller Agrar GmbH\n";
        std::fs::write(&path, bytes).unwrap();

        let table = read_table(&path).unwrap();
        assert!(table.content.contains("Müller Agrar GmbH"));
        assert_eq!(table.delimiter, b';');
    }

    #[test]
    fn decode_utf8_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actors.csv");
        std::fs::write(&path, "MastrNummer;Firmenname\nABR1;Müller Agrar GmbH\n").unwrap();

        let table = read_table(&path).unwrap();
        assert!(table.content.contains("Müller Agrar GmbH"));
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let err = read_table(Path::new("/nonexistent/actors.csv")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn operator_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operators.csv");
        write_operator_table(&path, &[operator("ABR1", Some("info@x.de"))]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "canonical_id,name,email,phone,website,member_count,member_ids"
        );
        assert_eq!(
            lines.next().unwrap(),
            "ABR1,Bioenergie Husum GmbH,info@x.de,,,2,ABR1; ABR1-b"
        );
    }

    #[test]
    fn mapping_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        let mapping = vec![
            MappingRow { raw_id: "ABR1".into(), canonical_id: "ABR1".into() },
            MappingRow { raw_id: "ABR2".into(), canonical_id: "ABR1".into() },
        ];
        write_mapping_table(&path, &mapping).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "raw_id,canonical_id\nABR1,ABR1\nABR2,ABR1\n");
    }

    #[test]
    fn plant_table_joins_canonical_contacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plants.csv");

        let op = operator("ABR1", Some("info@x.de"));
        let operators = HashMap::from([("ABR1", &op)]);
        let plants = vec![
            PlantRecord {
                plant_id: "SEE1".into(),
                operator_id: Some("ABR1".into()),
                raw_fields: HashMap::from([("Postleitzahl".to_string(), "25813".to_string())]),
            },
            PlantRecord {
                plant_id: "SEE2".into(),
                operator_id: None,
                raw_fields: HashMap::from([("Postleitzahl".to_string(), "24103".to_string())]),
            },
        ];
        write_plant_table(&path, &plants, &operators).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "plant_id,operator_id,Postleitzahl,operator_name,operator_email,operator_phone,operator_website"
        );
        assert_eq!(
            lines.next().unwrap(),
            "SEE1,ABR1,25813,Bioenergie Husum GmbH,info@x.de,,"
        );
        assert_eq!(lines.next().unwrap(), "SEE2,,24103,,,,");
    }
}
