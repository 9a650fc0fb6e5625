use crate::model::{NodeKind, Record};

fn kind_str(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::File => "file",
        NodeKind::Dir => "dir",
    }
}

fn opt(v: Option<u32>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub fn to_csv(records: &[Record], mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record(["index", "path", "kind", "offset", "length", "children"])?;
    for r in records {
        writer.write_record([
            r.index.to_string(),
            r.path.clone(),
            kind_str(r.kind).to_string(),
            opt(r.offset),
            opt(r.length),
            opt(r.children),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(records: &[Record]) -> serde_json::Value {
    serde_json::json!({
        "records": records.iter().map(|r| serde_json::json!({
            "index": r.index,
            "path": r.path,
            "kind": kind_str(r.kind),
            "offset": r.offset,
            "length": r.length,
            "children": r.children,
        })).collect::<Vec<_>>()
    })
}
