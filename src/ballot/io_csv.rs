// Primitives for reading and writing the CSV ballot log.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use csv::StringRecord;

use crate::ballot::*;

/// Reads all the rows of the log, after checking that its header matches the projects.
///
/// An empty file is an empty log.
pub fn read_ballot_log(path: &Path, projects: &[String]) -> BallotResult<Vec<Vec<u32>>> {
    let path_s = path.display().to_string();
    let mut records = get_records(path)?;

    let header = match records.next() {
        Some(line_r) => line_r.context(CsvLineParseSnafu {
            path: path_s.clone(),
            lineno: 1u64,
        })?,
        None => return Ok(Vec::new()),
    };
    check_header(&path_s, &header, projects)?;

    let mut res: Vec<Vec<u32>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu {
            path: path_s.clone(),
            lineno,
        })?;
        debug!("read_ballot_log: lineno: {:?} row: {:?}", lineno, line);
        ensure!(
            line.len() == projects.len(),
            RowLengthSnafu {
                path: path_s.clone(),
                lineno,
                found: line.len(),
                expected: projects.len(),
            }
        );
        let mut row: Vec<u32> = Vec::new();
        for cell in line.iter() {
            let points = cell.trim().parse::<u32>().context(CellParseSnafu {
                path: path_s.clone(),
                lineno,
                content: cell,
            })?;
            row.push(points);
        }
        res.push(row);
    }
    Ok(res)
}

/// Writes the whole log: the header, then one row per ballot.
pub fn write_ballot_log(path: &Path, projects: &[String], rows: &[Vec<u32>]) -> BallotResult<()> {
    let path_s = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu {
        path: path_s.clone(),
    })?;
    wtr.write_record(projects).context(CsvWriteSnafu {
        path: path_s.clone(),
    })?;
    for row in rows.iter() {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .context(CsvWriteSnafu {
                path: path_s.clone(),
            })?;
    }
    wtr.flush().context(WritingLogSnafu { path: path_s })
}

/// Adds one row at the end of the log without reading the previous rows.
/// The header is written if the file does not exist yet or is empty, and checked otherwise.
pub fn append_ballot(path: &Path, projects: &[String], row: &[u32]) -> BallotResult<()> {
    let path_s = path.display().to_string();
    let needs_header = match fs::metadata(path) {
        Ok(m) => m.len() == 0,
        Err(_) => true,
    };
    if !needs_header {
        let mut records = get_records(path)?;
        if let Some(line_r) = records.next() {
            let header = line_r.context(CsvLineParseSnafu {
                path: path_s.clone(),
                lineno: 1u64,
            })?;
            check_header(&path_s, &header, projects)?;
        }
    }
    let missing_terminator = !needs_header && !ends_with_newline(path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(WritingLogSnafu {
            path: path_s.clone(),
        })?;
    if missing_terminator {
        debug!("append_ballot: {:?} does not end with a newline", path);
        file.write_all(b"\n").context(WritingLogSnafu {
            path: path_s.clone(),
        })?;
    }
    let mut wtr = csv::Writer::from_writer(file);
    if needs_header {
        wtr.write_record(projects).context(CsvWriteSnafu {
            path: path_s.clone(),
        })?;
    }
    wtr.write_record(row.iter().map(|v| v.to_string()))
        .context(CsvWriteSnafu {
            path: path_s.clone(),
        })?;
    wtr.flush().context(WritingLogSnafu { path: path_s })
}

fn ends_with_newline(path: &Path) -> BallotResult<bool> {
    let path_s = path.display().to_string();
    let mut file = File::open(path).context(WritingLogSnafu {
        path: path_s.clone(),
    })?;
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .context(WritingLogSnafu { path: path_s })?;
    Ok(last[0] == b'\n')
}

fn get_records(path: &Path) -> BallotResult<csv::StringRecordsIntoIter<File>> {
    // Row lengths are checked by the callers, to report them with the line number.
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path.display().to_string(),
        })?;
    Ok(rdr.into_records())
}

fn check_header(path: &str, header: &StringRecord, projects: &[String]) -> BallotResult<()> {
    let found: Vec<String> = header.iter().map(|s| s.to_string()).collect();
    debug!("check_header: {:?} header: {:?}", path, found);
    ensure!(
        found == projects,
        SchemaMismatchSnafu {
            path,
            expected: projects.to_vec(),
            found,
        }
    );
    Ok(())
}
