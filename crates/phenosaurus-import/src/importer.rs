//! Transactional CSV import and export.

use phenosaurus_db::Database;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ImportError, Result};
use crate::resources::{
    GeneResource, IpsDatapointResource, LocationResource, PssDatapointResource, Resource,
    ResourceKind, RowOutcome,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based data row, not counting the header
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub resource: &'static str,
    pub new: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    pub dry_run: bool,
    /// Whether the changes were written
    pub committed: bool,
}

impl ImportReport {
    fn new(kind: ResourceKind, dry_run: bool) -> Self {
        Self {
            resource: kind.name(),
            new: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            dry_run,
            committed: false,
        }
    }

    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::New => self.new += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Import CSV `data` into the table behind `kind`. With `dry_run` the report
/// is produced but the transaction is always rolled back.
pub async fn import_csv(db: &Database, kind: ResourceKind, data: &[u8], dry_run: bool) -> Result<ImportReport> {
    match kind {
        ResourceKind::Genes => import_resource(db, kind, &GeneResource, data, dry_run).await,
        ResourceKind::Locations => import_resource(db, kind, &LocationResource, data, dry_run).await,
        ResourceKind::IpsDatapoints => import_resource(db, kind, &IpsDatapointResource, data, dry_run).await,
        ResourceKind::PssDatapoints => import_resource(db, kind, &PssDatapointResource, data, dry_run).await,
    }
}

/// Write all rows of `kind` as CSV, returning the number of data rows.
pub async fn export_csv<W: std::io::Write>(db: &Database, kind: ResourceKind, out: W) -> Result<usize> {
    match kind {
        ResourceKind::Genes => export_resource(db, &GeneResource, out).await,
        ResourceKind::Locations => export_resource(db, &LocationResource, out).await,
        ResourceKind::IpsDatapoints => export_resource(db, &IpsDatapointResource, out).await,
        ResourceKind::PssDatapoints => export_resource(db, &PssDatapointResource, out).await,
    }
}

async fn import_resource<R: Resource>(
    db: &Database,
    kind: ResourceKind,
    resource: &R,
    data: &[u8],
    dry_run: bool,
) -> Result<ImportReport> {
    let rows = read_records::<R>(data)?;
    let mut report = ImportReport::new(kind, dry_run);

    let mut tx = db.pool().begin().await?;
    for (index, row) in rows.into_iter().enumerate() {
        let result = match row {
            Ok(record) => resource.upsert(&mut *tx, &record).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(outcome) => report.record(outcome),
            Err(e) => report.errors.push(RowError { row: index + 1, message: e.to_string() }),
        }
    }

    if dry_run || report.has_errors() {
        tx.rollback().await?;
    } else {
        tx.commit().await?;
        report.committed = true;
    }

    if report.has_errors() {
        warn!(
            "Import of {} rolled back: {} row error(s)",
            kind,
            report.errors.len()
        );
    } else {
        info!(
            "Imported {}: {} new, {} updated, {} skipped{}",
            kind,
            report.new,
            report.updated,
            report.skipped,
            if dry_run { " (dry run)" } else { "" }
        );
    }
    Ok(report)
}

/// Parse all rows up front so no CSV reader is held across awaits.
fn read_records<R: Resource>(data: &[u8]) -> Result<Vec<Result<R::Record>>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = R::HEADERS
        .iter()
        .filter(|h| !headers.iter().any(|found| found == **h))
        .map(|h| h.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    Ok(reader
        .deserialize::<R::Record>()
        .map(|row| row.map_err(ImportError::from))
        .collect())
}

async fn export_resource<R: Resource, W: std::io::Write>(db: &Database, resource: &R, out: W) -> Result<usize> {
    let records = resource.export(db.pool()).await?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(R::HEADERS)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phenosaurus_db::{GeneRepository, IpsDatapointRepository, NewScreen, ScreenRepository};
    use pretty_assertions::assert_eq;

    async fn db_with_screen() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        let screens = ScreenRepository::new(db.clone().into_shared());
        screens
            .create(&NewScreen { name: "PD-L1".into(), ..Default::default() })
            .await
            .unwrap();
        db
    }

    const GENES: &str = "id,name,description,chromosome,orientation\n\
                         ,EZH2,histone methyltransferase,7,-\n\
                         ,EED,,7,+\n";

    #[tokio::test]
    async fn test_import_new_then_skip_and_update() {
        let db = db_with_screen().await;
        let report = import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), false).await.unwrap();
        assert_eq!((report.new, report.updated, report.skipped), (2, 0, 0));
        assert!(report.committed);

        let genes = GeneRepository::new(db.clone().into_shared());
        let ezh2 = genes.find_by_name("EZH2").await.unwrap().unwrap();
        let eed = genes.find_by_name("EED").await.unwrap().unwrap();

        let second = format!(
            "id,name,description,chromosome,orientation\n\
             {},EZH2,histone methyltransferase,7,-\n\
             {},EED,polycomb,7,+\n",
            ezh2.id, eed.id
        );
        let report = import_csv(&db, ResourceKind::Genes, second.as_bytes(), false).await.unwrap();
        assert_eq!((report.new, report.updated, report.skipped), (0, 1, 1));
        assert_eq!(genes.find_by_name("EED").await.unwrap().unwrap().description, "polycomb");
    }

    #[tokio::test]
    async fn test_dry_run_rolls_back() {
        let db = db_with_screen().await;
        let report = import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), true).await.unwrap();
        assert_eq!(report.new, 2);
        assert!(!report.committed);
        assert_eq!(db.stats().await.unwrap().genes, 0);
    }

    #[tokio::test]
    async fn test_row_error_rolls_back_everything() {
        let db = db_with_screen().await;
        import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), false).await.unwrap();

        let points = "id,relscreenname,relgenename,low,lowtotal,high,hightotal,insertions,lowcor,lowtotalcor,highcor,hightotalcor,pv,fcpv,mi\n\
                      ,PD-L1,EZH2,10,1000,40,1000,50,10,1000,40,1000,0.001,0.01,4.0\n\
                      ,PD-L1,NOPE,10,1000,40,1000,50,10,1000,40,1000,0.001,0.01,4.0\n\
                      ,MISSING,EED,10,1000,40,1000,50,10,1000,40,1000,0.001,0.01,4.0\n";
        let report = import_csv(&db, ResourceKind::IpsDatapoints, points.as_bytes(), false).await.unwrap();

        assert_eq!(report.new, 1);
        let rows: Vec<_> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 3]);
        assert!(report.errors[0].message.contains("NOPE"));
        assert!(report.errors[1].message.contains("MISSING"));
        assert!(!report.committed);
        assert_eq!(db.stats().await.unwrap().ips_datapoints, 0);
    }

    #[tokio::test]
    async fn test_missing_columns() {
        let db = db_with_screen().await;
        let err = import_csv(&db, ResourceKind::Locations, b"id,relgenename\n,EZH2\n", false)
            .await
            .unwrap_err();
        match err {
            ImportError::MissingColumns(cols) => assert_eq!(cols, vec!["startpos", "endpos"]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[tokio::test]
    async fn test_export_uses_names_and_headers() {
        let db = db_with_screen().await;
        import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), false).await.unwrap();
        let points = "id,relscreenname,relgenename,low,lowtotal,high,hightotal,insertions,lowcor,lowtotalcor,highcor,hightotalcor,pv,fcpv,mi\n\
                      ,PD-L1,EZH2,10,1000,40,1000,50,10,1000,40,1000,0.001,0.01,4.0\n";
        import_csv(&db, ResourceKind::IpsDatapoints, points.as_bytes(), false).await.unwrap();

        let shared = db.clone().into_shared();
        let stored = IpsDatapointRepository::new(shared.clone())
            .for_screen(1, &[1])
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);

        let mut out = Vec::new();
        let n = export_csv(&db, ResourceKind::IpsDatapoints, &mut out).await.unwrap();
        assert_eq!(n, 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(ResourceKind::IpsDatapoints.headers().join(",").as_str()));
        assert!(lines.next().unwrap().starts_with(&format!("{},PD-L1,EZH2,10,1000", stored[0].id)));

        let mut empty = Vec::new();
        assert_eq!(export_csv(&db, ResourceKind::Locations, &mut empty).await.unwrap(), 0);
        assert_eq!(String::from_utf8(empty).unwrap(), "id,relgenename,startpos,endpos\n");
    }

    const IPS_HEADER: &str =
        "id,relscreenname,relgenename,low,lowtotal,high,hightotal,insertions,lowcor,lowtotalcor,highcor,hightotalcor,pv,fcpv,mi";
    const PSS_HEADER: &str = "id,relscreenname,relgenename,nm,tnm,ct,tct,cct,ctct,pv,ti,fcpv,mi,radius,seq";

    async fn counts(db: &Database, kind: ResourceKind, csv: &str) -> (usize, usize, usize) {
        let report = import_csv(db, kind, csv.as_bytes(), false).await.unwrap();
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        (report.new, report.updated, report.skipped)
    }

    async fn exported(db: &Database, kind: ResourceKind) -> String {
        let mut out = Vec::new();
        export_csv(db, kind, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_locations_new_skip_update() {
        let db = db_with_screen().await;
        import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), false).await.unwrap();
        let header = "id,relgenename,startpos,endpos\n";

        assert_eq!(counts(&db, ResourceKind::Locations, &format!("{header},EZH2,100,200\n")).await, (1, 0, 0));
        assert_eq!(counts(&db, ResourceKind::Locations, &format!("{header}1,EZH2,100,200\n")).await, (0, 0, 1));
        assert_eq!(counts(&db, ResourceKind::Locations, &format!("{header}1,EED,100,300\n")).await, (0, 1, 0));

        let genes = GeneRepository::new(db.clone().into_shared());
        let eed = genes.find_by_name("EED").await.unwrap().unwrap();
        let locations = genes.locations(eed.id).await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!((locations[0].startpos, locations[0].endpos), (100, 300));
        assert_eq!(exported(&db, ResourceKind::Locations).await, format!("{header}1,EED,100,300\n"));
    }

    #[tokio::test]
    async fn test_ips_changed_values_replace_row() {
        let db = db_with_screen().await;
        import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), false).await.unwrap();

        let first = format!("{IPS_HEADER}\n,PD-L1,EZH2,10,1000,40,1000,50,10,1000,40,1000,0.001,0.01,4.0\n");
        assert_eq!(counts(&db, ResourceKind::IpsDatapoints, &first).await, (1, 0, 0));

        let again = format!(
            "{IPS_HEADER}\n\
             1,PD-L1,EZH2,10,1000,40,1000,50,10,1000,40,1000,0.001,0.01,4.0\n\
             1,PD-L1,EZH2,11,1000,40,1000,51,11,1000,40,1000,0.001,0.01,4.1\n"
        );
        assert_eq!(counts(&db, ResourceKind::IpsDatapoints, &again).await, (0, 1, 1));
        assert_eq!(db.stats().await.unwrap().ips_datapoints, 1);

        let text = exported(&db, ResourceKind::IpsDatapoints).await;
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "1,PD-L1,EZH2,11,1000,40,1000,51,11,1000,40,1000,0.001,0.01,4.1");
    }

    #[tokio::test]
    async fn test_pss_new_skip_update_and_export() {
        let db = db_with_screen().await;
        import_csv(&db, ResourceKind::Genes, GENES.as_bytes(), false).await.unwrap();

        let row = "PD-L1,EED,5,900,7,1100,5,900,0.2,12,0.3,1.4,2.5,3";
        assert_eq!(counts(&db, ResourceKind::PssDatapoints, &format!("{PSS_HEADER}\n,{row}\n")).await, (1, 0, 0));
        assert_eq!(counts(&db, ResourceKind::PssDatapoints, &format!("{PSS_HEADER}\n1,{row}\n")).await, (0, 0, 1));

        let moved = "PD-L1,EED,5,900,7,1100,5,900,0.2,12,0.3,1.4,2.5,4";
        assert_eq!(counts(&db, ResourceKind::PssDatapoints, &format!("{PSS_HEADER}\n1,{moved}\n")).await, (0, 1, 0));
        assert_eq!(db.stats().await.unwrap().pss_datapoints, 1);

        assert_eq!(
            exported(&db, ResourceKind::PssDatapoints).await,
            format!("{PSS_HEADER}\n1,{moved}\n")
        );
    }
}
