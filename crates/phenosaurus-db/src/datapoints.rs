//! Datapoint repository for intracellular phenotype (IPS) screens.
//!
//! Every read takes the caller's authorized screen ids; datapoints of any
//! other screen are never returned. Positive selection datapoints only
//! pass through CSV import and export.

use std::sync::Arc;

use sqlx::QueryBuilder;
use tracing::debug;

use crate::database::{push_id_list, push_name_list, Database};
use crate::error::Result;
use crate::schema::{IpsDatapointView, NewIpsDatapoint};

const IPS_VIEW_SELECT: &str = r#"
    SELECT d.id, d.screen_id, s.name AS screen_name, d.gene_id, g.name AS gene_name,
           d.low, d.high, d.pv, d.fcpv, d.mi, d.insertions
    FROM ips_datapoints d
    JOIN screens s ON s.id = d.screen_id
    JOIN genes g ON g.id = d.gene_id
"#;

#[derive(Clone)]
pub struct IpsDatapointRepository {
    db: Arc<Database>,
}

impl IpsDatapointRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All datapoints of one screen, provided it is authorized.
    pub async fn for_screen(&self, screen_id: i64, authorized: &[i64]) -> Result<Vec<IpsDatapointView>> {
        if !authorized.contains(&screen_id) {
            return Ok(Vec::new());
        }
        let points = sqlx::query_as::<_, IpsDatapointView>(&format!(
            "{IPS_VIEW_SELECT} WHERE d.screen_id = ? ORDER BY d.id"
        ))
        .bind(screen_id)
        .fetch_all(self.db.pool())
        .await?;
        debug!("screen {} has {} IPS datapoints", screen_id, points.len());
        Ok(points)
    }

    /// Datapoints of the named genes in `screen_ids`, restricted to `authorized`.
    pub async fn for_genes(
        &self,
        gene_names: &[String],
        screen_ids: &[i64],
        authorized: &[i64],
    ) -> Result<Vec<IpsDatapointView>> {
        let screens: Vec<i64> = screen_ids
            .iter()
            .copied()
            .filter(|id| authorized.contains(id))
            .collect();
        if gene_names.is_empty() || screens.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::new(IPS_VIEW_SELECT);
        qb.push(" WHERE g.name IN ");
        push_name_list(&mut qb, gene_names);
        qb.push(" AND d.screen_id IN ");
        push_id_list(&mut qb, &screens);
        qb.push(" ORDER BY d.id");

        Ok(qb.build_query_as::<IpsDatapointView>().fetch_all(self.db.pool()).await?)
    }

    pub async fn insert(&self, point: &NewIpsDatapoint) -> Result<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO ips_datapoints
                (screen_id, gene_id, low, lowtotal, high, hightotal, lowcor, lowtotalcor,
                 highcor, hightotalcor, pv, fcpv, mi, insertions)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(point.screen_id)
        .bind(point.gene_id)
        .bind(point.low)
        .bind(point.lowtotal)
        .bind(point.high)
        .bind(point.hightotal)
        .bind(point.lowcor)
        .bind(point.lowtotalcor)
        .bind(point.highcor)
        .bind(point.hightotalcor)
        .bind(point.pv)
        .bind(point.fcpv)
        .bind(point.mi)
        .bind(point.insertions)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genes::GeneRepository;
    use crate::schema::{NewGene, NewScreen};
    use crate::screens::ScreenRepository;

    struct Fixture {
        ips: IpsDatapointRepository,
        screen_a: i64,
        screen_b: i64,
    }

    async fn fixture() -> Fixture {
        let db = Database::open_in_memory().await.unwrap().into_shared();
        let screens = ScreenRepository::new(db.clone());
        let genes = GeneRepository::new(db.clone());
        let ips = IpsDatapointRepository::new(db.clone());

        let screen_a = screens
            .create(&NewScreen { name: "A".into(), ..Default::default() })
            .await
            .unwrap();
        let screen_b = screens
            .create(&NewScreen { name: "B".into(), ..Default::default() })
            .await
            .unwrap();
        let ezh2 = genes.insert(&NewGene { name: "EZH2".into(), ..Default::default() }).await.unwrap();
        let eed = genes.insert(&NewGene { name: "EED".into(), ..Default::default() }).await.unwrap();

        for (screen_id, gene_id, mi) in [(screen_a, ezh2, 0.5), (screen_a, eed, 2.0), (screen_b, ezh2, 1.5)] {
            ips.insert(&NewIpsDatapoint {
                screen_id,
                gene_id,
                mi,
                fcpv: 0.01,
                insertions: 100,
                ..Default::default()
            })
            .await
            .unwrap();
        }

        Fixture { ips, screen_a, screen_b }
    }

    #[tokio::test]
    async fn test_for_screen_requires_authorization() {
        let f = fixture().await;
        let points = f.ips.for_screen(f.screen_a, &[f.screen_a]).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].gene_name, "EZH2");
        assert_eq!(points[0].screen_name, "A");

        assert!(f.ips.for_screen(f.screen_a, &[f.screen_b]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_for_genes_filters_screens_and_names() {
        let f = fixture().await;
        let genes = vec!["EZH2".to_string()];

        let both = f
            .ips
            .for_genes(&genes, &[f.screen_a, f.screen_b], &[f.screen_a, f.screen_b])
            .await
            .unwrap();
        assert_eq!(both.len(), 2);
        assert!(both.iter().all(|p| p.gene_name == "EZH2"));

        // screen B requested but not authorized
        let only_a = f.ips.for_genes(&genes, &[f.screen_a, f.screen_b], &[f.screen_a]).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].screen_id, f.screen_a);

        assert!(f.ips.for_genes(&[], &[f.screen_a], &[f.screen_a]).await.unwrap().is_empty());
    }
}
