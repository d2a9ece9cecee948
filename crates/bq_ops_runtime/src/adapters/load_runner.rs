use bq_ops_core::contract::LoadJobConfig;

pub trait LoadRunner {
    /// Submit an append-mode CSV load job and block until the warehouse
    /// reports completion. A failed load surfaces as an error.
    fn load_csv(
        &self,
        source_uri: &str,
        table_id: &str,
        config: &LoadJobConfig,
    ) -> Result<(), String>;

    fn table_row_count(&self, table_id: &str) -> Result<u64, String>;
}
