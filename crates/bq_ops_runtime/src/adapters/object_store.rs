pub trait ObjectLister {
    /// Names of all objects under the prefix, following the collaborator's
    /// pagination to exhaustion.
    fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>, String>;
}
