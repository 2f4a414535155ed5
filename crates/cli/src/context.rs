//! Per-run context: the run root, its settings, and lazily built clients.

use std::path::{Path, PathBuf};

use rostersync_aws::{CognitoDirectory, DynamoStore};
use rostersync_config::{AmplifyOutputs, Settings};
use rostersync_data_client::DataClient;

use crate::CliError;

pub struct Context {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn load(root: PathBuf) -> Result<Self, CliError> {
        let settings = Settings::load(&root)?;
        Ok(Self { root, settings })
    }

    pub fn path(&self, configured: &Path) -> PathBuf {
        Settings::resolve(&self.root, configured)
    }

    /// Results file `name` inside the configured results directory.
    pub fn results_path(&self, name: &str) -> PathBuf {
        self.path(&self.settings.files.results_dir).join(name)
    }

    pub fn roster_path(&self) -> PathBuf {
        self.path(&self.settings.files.roster)
    }

    pub fn intake_path(&self) -> PathBuf {
        self.path(&self.settings.files.intake)
    }

    fn outputs(&self) -> Result<AmplifyOutputs, CliError> {
        Ok(AmplifyOutputs::load(&self.path(&self.settings.files.amplify_outputs))?)
    }

    pub fn data_client(&self) -> Result<DataClient, CliError> {
        let outputs = self.outputs()?;
        let data = outputs.data()?;
        log::info!("data API: {}", data.url);
        Ok(DataClient::new(data.url.clone(), data.api_key.clone())?)
    }

    pub fn identity_directory(&self) -> Result<CognitoDirectory, CliError> {
        let outputs = self.outputs()?;
        let auth = outputs.auth()?;
        log::info!("user pool: {}", auth.user_pool_id);
        Ok(CognitoDirectory::connect(&auth.user_pool_id, &auth.aws_region)?)
    }

    pub fn roster_table(&self) -> Result<DynamoStore, CliError> {
        let table = &self.settings.roster_table;
        log::info!("roster table: {} ({})", table.name, table.region);
        Ok(DynamoStore::connect(&table.name, &table.region, table.endpoint_url.as_deref())?)
    }
}
