//! Readers for the tab-separated sample input tables
//!

use std::collections::HashSet;
use std::fs::File;
use std::io;

use camino::Utf8Path;
use csv::{Reader, ReaderBuilder, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use simple_error::{SimpleResult, bail, map_err_with};
use unwrap::unwrap;

use crate::cluster_svs::LohSegment;
use crate::ref_genome::{ChromCoords, RefGenomeCoords};
use crate::sv::{BreakendInput, ChromCopyNumbers, SvInput, SvType};

#[derive(Deserialize)]
struct SvTableRecord {
    id: String,
    #[serde(rename = "type")]
    sv_type: SvType,
    chrom_start: String,
    pos_start: i64,
    orient_start: i8,
    chrom_end: Option<String>,
    pos_end: Option<i64>,
    orient_end: Option<i8>,
    ploidy: f64,
    cn_start: f64,
    cn_change_start: f64,
    cn_end: Option<f64>,
    cn_change_end: Option<f64>,
    asm_start: Option<String>,
    asm_end: Option<String>,
    line_start: Option<bool>,
    line_end: Option<bool>,
}

#[derive(Deserialize)]
struct ChromCopyNumberRecord {
    chrom: String,
    copy_number: f64,
}

fn get_table_reader<R: io::Read>(rdr: R) -> Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(rdr)
}

fn parse_table<T: DeserializeOwned, R: io::Read>(rdr: R, label: &str) -> SimpleResult<Vec<T>> {
    let mut reader = get_table_reader(rdr);
    let mut records = Vec::new();
    for (record_index, result) in reader.deserialize().enumerate() {
        let record = map_err_with!(
            result,
            "Failed to parse {} table record {}",
            label,
            record_index + 1
        )?;
        records.push(record);
    }
    Ok(records)
}

fn open_table(filename: &Utf8Path, label: &str) -> File {
    unwrap!(
        File::open(filename),
        "Unable to open {label} table file: '{filename}'"
    )
}

fn parse_assembly_tokens(tokens: Option<String>) -> Vec<String> {
    match tokens {
        Some(x) => x
            .split(';')
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
            .map(|x| x.to_string())
            .collect(),
        None => Vec::new(),
    }
}

fn check_orientation(id: &str, orientation: i8) -> SimpleResult<()> {
    if orientation != 1 && orientation != -1 {
        bail!("SV '{id}' has invalid breakend orientation '{orientation}', must be 1 or -1");
    }
    Ok(())
}

impl SvTableRecord {
    fn into_sv_input(self) -> SimpleResult<SvInput> {
        check_orientation(&self.id, self.orient_start)?;
        let start = BreakendInput {
            chrom: self.chrom_start,
            pos: self.pos_start,
            orientation: self.orient_start,
            copy_number: self.cn_start,
            copy_number_change: self.cn_change_start,
            assembly_tokens: parse_assembly_tokens(self.asm_start),
            is_line_element: self.line_start.unwrap_or(false),
        };

        let end = if self.sv_type.is_single_breakend() {
            None
        } else {
            let (Some(chrom), Some(pos), Some(orientation)) =
                (self.chrom_end, self.pos_end, self.orient_end)
            else {
                bail!(
                    "SV '{}' of type {} is missing end breakend columns",
                    self.id,
                    self.sv_type
                );
            };
            check_orientation(&self.id, orientation)?;
            Some(BreakendInput {
                chrom,
                pos,
                orientation,
                copy_number: self.cn_end.unwrap_or(self.cn_start),
                copy_number_change: self.cn_change_end.unwrap_or(self.cn_change_start),
                assembly_tokens: parse_assembly_tokens(self.asm_end),
                is_line_element: self.line_end.unwrap_or(false),
            })
        };

        Ok(SvInput {
            id: self.id,
            sv_type: self.sv_type,
            start,
            end,
            ploidy: self.ploidy,
        })
    }
}

fn parse_sv_table<R: io::Read>(rdr: R) -> SimpleResult<Vec<SvInput>> {
    let records = parse_table::<SvTableRecord, _>(rdr, "SV")?;
    let mut sv_inputs = Vec::with_capacity(records.len());
    let mut sv_ids = HashSet::new();
    for record in records {
        let sv_input = record.into_sv_input()?;
        if !sv_ids.insert(sv_input.id.clone()) {
            bail!("SV id '{}' is repeated in the SV table", sv_input.id);
        }
        sv_inputs.push(sv_input);
    }
    Ok(sv_inputs)
}

fn parse_ref_coords<R: io::Read>(rdr: R) -> SimpleResult<RefGenomeCoords> {
    let records = parse_table::<ChromCoords, _>(rdr, "reference coordinate")?;
    for record in records.iter() {
        if record.length <= 0 || record.centromere < 0 || record.centromere > record.length {
            bail!(
                "Invalid reference coordinates for chromosome '{}': length {} centromere {}",
                record.chrom,
                record.length,
                record.centromere
            );
        }
    }
    Ok(RefGenomeCoords::from_records(records))
}

fn parse_chrom_copy_numbers<R: io::Read>(
    rdr: R,
    default_copy_number: f64,
) -> SimpleResult<ChromCopyNumbers> {
    let records = parse_table::<ChromCopyNumberRecord, _>(rdr, "chromosome copy number")?;
    let mut chrom_copy_numbers = ChromCopyNumbers::new(default_copy_number);
    for record in records {
        if record.copy_number < 0.0 {
            bail!(
                "Chromosome '{}' has negative copy number {}",
                record.chrom,
                record.copy_number
            );
        }
        chrom_copy_numbers.data.insert(record.chrom, record.copy_number);
    }
    Ok(chrom_copy_numbers)
}

pub fn read_sv_table(filename: &Utf8Path) -> Vec<SvInput> {
    let file = open_table(filename, "SV");
    unwrap!(
        parse_sv_table(file),
        "Failed to read SV table file: '{filename}'"
    )
}

pub fn read_ref_coords(filename: &Utf8Path) -> RefGenomeCoords {
    let file = open_table(filename, "reference coordinate");
    unwrap!(
        parse_ref_coords(file),
        "Failed to read reference coordinate table file: '{filename}'"
    )
}

pub fn read_loh_segments(filename: &Utf8Path) -> Vec<LohSegment> {
    let file = open_table(filename, "LOH");
    unwrap!(
        parse_table(file, "LOH"),
        "Failed to read LOH table file: '{filename}'"
    )
}

pub fn read_chrom_copy_numbers(filename: &Utf8Path, default_copy_number: f64) -> ChromCopyNumbers {
    let file = open_table(filename, "chromosome copy number");
    unwrap!(
        parse_chrom_copy_numbers(file, default_copy_number),
        "Failed to read chromosome copy number table file: '{filename}'"
    )
}
