//! Neo4j client for the protein similarity graph

use super::models::*;
use crate::error::AnnotationError;
use crate::graph::models::SimilarityEdge;
use crate::models::{Attribute, ProteinStatus};
use anyhow::{Context, Result};
use neo4rs::{query, Graph, Query};
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Connect and initialise the schema.
    ///
    /// Connection failures surface as [`AnnotationError::StoreUnavailable`].
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password).await.map_err(|e| {
            anyhow::Error::new(AnnotationError::StoreUnavailable(format!("Neo4j at {}", uri)))
                .context(e.to_string())
        })?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    async fn init_schema(&self) -> Result<()> {
        let statements = [
            "CREATE CONSTRAINT protein_id IF NOT EXISTS FOR (p:Protein) REQUIRE p.protein_id IS UNIQUE",
            "CREATE INDEX protein_name IF NOT EXISTS FOR (p:Protein) ON (p.name)",
            "CREATE INDEX protein_status IF NOT EXISTS FOR (p:Protein) ON (p.status)",
        ];

        for statement in statements {
            if let Err(e) = self.graph.run(query(statement)).await {
                tracing::warn!("Schema statement skipped (may already exist): {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query and collect all rows
    async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run a `RETURN count(...) AS count` query
    async fn count(&self, cypher: &str) -> Result<usize> {
        let rows = self.execute_with_params(query(cypher)).await?;
        let count = match rows.first() {
            Some(row) => row.get::<i64>("count")?,
            None => 0,
        };
        Ok(count.max(0) as usize)
    }

    fn node_to_protein(node: &neo4rs::Node) -> Result<ProteinNode> {
        let name: Option<String> = node.get("name").ok().filter(|s: &String| !s.is_empty());
        let taxonomy_id: Option<String> = node
            .get("taxonomy_id")
            .ok()
            .filter(|s: &String| !s.is_empty());
        Ok(ProteinNode {
            protein_id: node.get("protein_id")?,
            name,
            status: node
                .get::<String>("status")
                .map(|s| ProteinStatus::parse_lenient(&s))
                .unwrap_or_default(),
            ec_numbers: node.get("ec_numbers").unwrap_or_default(),
            go_terms: node.get("go_terms").unwrap_or_default(),
            domain_count: node.get::<i64>("domain_count").unwrap_or(0).max(0) as usize,
            taxonomy_id,
        })
    }

    // ========================================================================
    // Build operations
    // ========================================================================

    /// Delete every node and relationship
    pub async fn clear(&self) -> Result<()> {
        self.graph
            .run(query("MATCH (n) DETACH DELETE n"))
            .await
            .context("Failed to clear graph")?;
        Ok(())
    }

    /// Create or update a protein node
    pub async fn upsert_node(&self, node: &ProteinNode) -> Result<()> {
        let q = query(
            r#"
            MERGE (p:Protein {protein_id: $protein_id})
            SET p.name = $name,
                p.status = $status,
                p.ec_numbers = $ec_numbers,
                p.go_terms = $go_terms,
                p.domain_count = $domain_count,
                p.taxonomy_id = $taxonomy_id
            "#,
        )
        .param("protein_id", node.protein_id.clone())
        .param("name", node.name.clone().unwrap_or_default())
        .param("status", node.status.as_str())
        .param("ec_numbers", node.ec_numbers.clone())
        .param("go_terms", node.go_terms.clone())
        .param("domain_count", node.domain_count as i64)
        .param("taxonomy_id", node.taxonomy_id.clone().unwrap_or_default());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Create or update the similarity edge between two existing nodes
    pub async fn upsert_edge(&self, edge: &SimilarityEdge) -> Result<bool> {
        let shared: Vec<String> = edge.shared_domains.iter().cloned().collect();
        let q = query(
            r#"
            MATCH (a:Protein {protein_id: $protein_a})
            MATCH (b:Protein {protein_id: $protein_b})
            MERGE (a)-[r:SIMILAR_TO]-(b)
            SET r.weight = $weight,
                r.jaccard_similarity = $jaccard_similarity,
                r.shared_domains = $shared_domains,
                r.shared_domain_count = $shared_domain_count
            RETURN r.weight AS weight
            "#,
        )
        .param("protein_a", edge.protein_a.clone())
        .param("protein_b", edge.protein_b.clone())
        .param("weight", edge.weight())
        .param("jaccard_similarity", edge.jaccard_similarity)
        .param("shared_domains", shared)
        .param("shared_domain_count", edge.shared_domain_count() as i64);

        let rows = self.execute_with_params(q).await?;
        Ok(!rows.is_empty())
    }

    // ========================================================================
    // Propagation operations
    // ========================================================================

    /// Every node with its labels and undirected neighbour ids
    pub async fn neighbors_with_labels(&self, attribute: Attribute) -> Result<Vec<LabeledNeighbors>> {
        let cypher = format!(
            r#"
            MATCH (p:Protein)
            RETURN p.protein_id AS protein_id,
                   coalesce(p.{}, []) AS labels,
                   [(p)-[:SIMILAR_TO]-(n:Protein) | n.protein_id] AS neighbors
            "#,
            attribute.property()
        );

        let rows = self.execute_with_params(query(&cypher)).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut neighbor_ids: Vec<String> = row.get("neighbors").unwrap_or_default();
            neighbor_ids.sort();
            neighbor_ids.dedup();
            out.push(LabeledNeighbors {
                protein_id: row.get("protein_id")?,
                labels: row.get("labels").unwrap_or_default(),
                neighbor_ids,
            });
        }
        Ok(out)
    }

    /// Overwrite a node's labels for `attribute`
    pub async fn set_labels(
        &self,
        protein_id: &str,
        labels: &[String],
        attribute: Attribute,
    ) -> Result<bool> {
        let cypher = format!(
            r#"
            MATCH (p:Protein {{protein_id: $protein_id}})
            SET p.{} = $labels
            RETURN p.protein_id AS protein_id
            "#,
            attribute.property()
        );
        let q = query(&cypher)
            .param("protein_id", protein_id)
            .param("labels", labels.to_vec());

        let rows = self.execute_with_params(q).await?;
        Ok(!rows.is_empty())
    }

    // ========================================================================
    // Query operations
    // ========================================================================

    /// Node/edge counts, degree summary and (if GDS is installed) clustering
    pub async fn graph_totals(&self) -> Result<GraphTotals> {
        let node_count = self.count("MATCH (p:Protein) RETURN count(p) AS count").await?;
        let reviewed_count = self
            .count("MATCH (p:Protein {status: 'reviewed'}) RETURN count(p) AS count")
            .await?;
        let unreviewed_count = self
            .count("MATCH (p:Protein) WHERE coalesce(p.status, 'unreviewed') <> 'reviewed' RETURN count(p) AS count")
            .await?;
        let isolated_node_count = self
            .count("MATCH (p:Protein) WHERE NOT (p)-[:SIMILAR_TO]-() RETURN count(p) AS count")
            .await?;
        let edge_count = self
            .count("MATCH (:Protein)-[r:SIMILAR_TO]->(:Protein) RETURN count(r) AS count")
            .await?;

        let clustering_coefficient = match self.gds_average_clustering().await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Clustering coefficient unavailable (GDS not installed?): {}", e);
                None
            }
        };

        Ok(GraphTotals {
            node_count,
            edge_count,
            isolated_node_count,
            reviewed_count,
            unreviewed_count,
            average_degree: GraphTotals::degree_of(node_count, edge_count),
            clustering_coefficient,
        })
    }

    async fn gds_average_clustering(&self) -> Result<Option<f64>> {
        let rows = self
            .execute_with_params(query(
                r#"
                CALL gds.localClusteringCoefficient.stream({
                    nodeProjection: 'Protein',
                    relationshipProjection: {
                        SIMILAR_TO: {type: 'SIMILAR_TO', orientation: 'UNDIRECTED'}
                    }
                })
                YIELD nodeId, localClusteringCoefficient
                RETURN avg(localClusteringCoefficient) AS avg_clustering
                "#,
            ))
            .await?;
        Ok(rows
            .first()
            .and_then(|row| row.get::<f64>("avg_clustering").ok()))
    }

    /// Nodes and edges within `depth` hops (depth is clamped to 1..=3)
    pub async fn neighborhood(&self, protein_id: &str, depth: usize) -> Result<GraphData> {
        let depth = depth.clamp(1, 3);
        // Variable-length bounds cannot be parameterised.
        let cypher = format!(
            r#"
            MATCH (p:Protein {{protein_id: $protein_id}})-[:SIMILAR_TO*0..{}]-(n:Protein)
            RETURN DISTINCT n
            "#,
            depth
        );
        let rows = self
            .execute_with_params(query(&cypher).param("protein_id", protein_id))
            .await?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("n")?;
            nodes.push(Self::node_to_protein(&node)?);
        }
        if nodes.is_empty() {
            return Ok(GraphData::default());
        }

        let ids: Vec<String> = nodes.iter().map(|n| n.protein_id.clone()).collect();
        let q = query(
            r#"
            MATCH (a:Protein)-[r:SIMILAR_TO]-(b:Protein)
            WHERE a.protein_id IN $ids AND b.protein_id IN $ids
              AND a.protein_id < b.protein_id
            RETURN a.protein_id AS a, b.protein_id AS b,
                   r.weight AS weight, r.jaccard_similarity AS jaccard,
                   coalesce(r.shared_domains, []) AS shared
            "#,
        )
        .param("ids", ids);

        let rows = self.execute_with_params(q).await?;
        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let shared_domains: Vec<String> = row.get("shared")?;
            edges.push(SimilarityRel {
                protein_a: row.get("a")?,
                protein_b: row.get("b")?,
                weight: row.get("weight").unwrap_or(0.0),
                jaccard_similarity: row.get("jaccard").unwrap_or(0.0),
                shared_domain_count: shared_domains.len(),
                shared_domains,
            });
        }

        Ok(GraphData { nodes, edges })
    }

    /// Case-insensitive substring search on id or name
    pub async fn search_proteins(&self, search: &str, limit: usize) -> Result<Vec<ProteinNode>> {
        let q = query(
            r#"
            MATCH (p:Protein)
            WHERE toLower(p.protein_id) CONTAINS toLower($search)
               OR toLower(coalesce(p.name, '')) CONTAINS toLower($search)
            RETURN p
            ORDER BY p.protein_id
            LIMIT $limit
            "#,
        )
        .param("search", search)
        .param("limit", limit as i64);

        let rows = self.execute_with_params(q).await?;
        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("p")?;
            nodes.push(Self::node_to_protein(&node)?);
        }
        Ok(nodes)
    }
}
