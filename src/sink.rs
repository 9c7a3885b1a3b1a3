use crate::models::StationRecord;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Column order of the output stream.
pub const CSV_HEADER: &str = "region id,subregion id,station id,region name,subregion name,station name,registered,attended,voted,invalid,yes,no";

/// Append-only record stream. Concurrent subregion tasks share one sink
/// behind a lock, so records never interleave; append order is
/// completion order, not submission order.
pub trait RecordSink: Send {
    fn write_record(&mut self, record: &StationRecord) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// A sink shared by the concurrent subregion tasks.
pub type SharedSink = Arc<Mutex<Box<dyn RecordSink>>>;

/// CSV sink. String fields are JSON-quoted so names containing commas
/// or quotes survive round-tripping; numeric fields are written bare.
pub struct CsvSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> CsvSink<W> {
    /// Wrap a writer and emit the header line.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{}", CSV_HEADER)?;
        Ok(Self { out })
    }
}

fn json_quote(text: &str) -> io::Result<String> {
    serde_json::to_string(text).map_err(io::Error::other)
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &StationRecord) -> io::Result<()> {
        let station_id = record.station_id.as_deref().unwrap_or("");
        writeln!(
            self.out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            json_quote(&record.region_id)?,
            json_quote(&record.subregion_id)?,
            json_quote(station_id)?,
            json_quote(&record.region_name)?,
            json_quote(&record.subregion_name)?,
            json_quote(&record.station_name)?,
            record.registered,
            record.attended,
            record.voted,
            record.invalid,
            record.yes,
            record.no,
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// One JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &StationRecord) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        writeln!(self.out, "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StationRecord {
        StationRecord {
            region_id: "A".to_string(),
            subregion_id: "A1".to_string(),
            station_id: Some("101".to_string()),
            region_name: "Region \"A\", North".to_string(),
            subregion_name: "Sub A1".to_string(),
            station_name: "Station 1".to_string(),
            registered: 100,
            attended: 80,
            voted: 75,
            invalid: 5,
            yes: 60,
            no: 15,
        }
    }

    #[test]
    fn csv_sink_writes_header_and_quoted_strings() {
        let mut out = Vec::new();
        {
            let mut sink = CsvSink::new(&mut out).unwrap();
            sink.write_record(&record()).unwrap();
            sink.flush().unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some(
                r#""A","A1","101","Region \"A\", North","Sub A1","Station 1",100,80,75,5,60,15"#
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_sink_writes_absent_station_id_as_empty() {
        let mut out = Vec::new();
        {
            let mut sink = CsvSink::new(&mut out).unwrap();
            let mut record = record();
            record.station_id = None;
            sink.write_record(&record).unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(r#""A1","","Region"#));
    }

    #[test]
    fn json_lines_sink_writes_one_object_per_line() {
        let mut out = Vec::new();
        {
            let mut sink = JsonLinesSink::new(&mut out);
            sink.write_record(&record()).unwrap();
            sink.write_record(&record()).unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        let parsed: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(parsed["station_id"], "101");
        assert_eq!(parsed["registered"], 100);
    }
}
