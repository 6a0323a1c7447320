//! Render entry points: validate, load, join, compose, write

use std::path::Path;

use crate::collect::load_dataset;
use crate::config::RenderConfig;
use crate::error::{PreconditionError, Result};
use crate::geometric::value_mapping::{IntoValueMapping, ValueMapping};
use crate::layers::choropleth::ChoroplethLayer;
use crate::layers::document::{MapDocument, MapView};
use crate::layers::overlay::OverlayLayer;

/// Renders a geometry file joined with a value mapping into an interactive HTML map
#[derive(Debug, Clone, Default)]
pub struct GeoChoroplethRenderer {
    config: RenderConfig,
}

impl GeoChoroplethRenderer {
    pub fn new(config: RenderConfig) -> Self {
        GeoChoroplethRenderer { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `file_path` shaded by `value_mapping` and write the page to `output_file_name`
    ///
    /// Every argument and the configuration are checked before anything is
    /// read, and the page is written in a single call at the end, so a
    /// failing render never leaves a new output file behind.
    pub fn render<P, Q, M>(
        &self,
        file_path: P,
        value_mapping: M,
        join_col_name: &str,
        value_name: &str,
        output_file_name: Q,
    ) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        M: IntoValueMapping,
    {
        let output = output_file_name.as_ref();
        if output.as_os_str().is_empty() {
            return Err(PreconditionError::EmptyArgument("output_file_name").into());
        }

        let document = self.build_document(file_path, value_mapping, join_col_name, value_name)?;
        document.save(output)?;
        Ok(())
    }

    /// Everything `render` does except writing the file
    pub fn build_document<P, M>(
        &self,
        file_path: P,
        value_mapping: M,
        join_col_name: &str,
        value_name: &str,
    ) -> Result<MapDocument>
    where
        P: AsRef<Path>,
        M: IntoValueMapping,
    {
        let file_path = file_path.as_ref();
        let mapping = self.check_preconditions(file_path, value_mapping, join_col_name, value_name)?;

        let dataset = load_dataset(file_path)?.to_geographic()?;
        if dataset.is_empty() {
            tracing::warn!(path = %file_path.display(), "Dataset has no features");
        }

        let choropleth = ChoroplethLayer::build(
            &dataset,
            &mapping,
            join_col_name,
            value_name,
            &self.config.choropleth,
        )?;
        let overlay = OverlayLayer::build(&dataset, &self.config.overlay)?;
        let view = MapView::resolve(&self.config.map, dataset.bounds());

        Ok(MapDocument::new(
            self.config.map.clone(),
            view,
            choropleth,
            overlay,
        ))
    }

    fn check_preconditions<M: IntoValueMapping>(
        &self,
        file_path: &Path,
        value_mapping: M,
        join_col_name: &str,
        value_name: &str,
    ) -> std::result::Result<ValueMapping, PreconditionError> {
        if file_path.as_os_str().is_empty() {
            return Err(PreconditionError::EmptyArgument("file_path"));
        }
        if join_col_name.is_empty() {
            return Err(PreconditionError::EmptyArgument("join_col_name"));
        }
        if value_name.is_empty() {
            return Err(PreconditionError::EmptyArgument("value_name"));
        }
        self.config.validate()?;
        let mapping = value_mapping.into_value_mapping()?;

        if !file_path.exists() {
            return Err(PreconditionError::InputNotFound(file_path.to_path_buf()));
        }
        Ok(mapping)
    }
}

/// Render with the default configuration
pub fn plot_geospatial_data<P, Q, M>(
    file_path: P,
    value_mapping: M,
    join_col_name: &str,
    value_name: &str,
    output_file_name: Q,
) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    M: IntoValueMapping,
{
    GeoChoroplethRenderer::default().render(
        file_path,
        value_mapping,
        join_col_name,
        value_name,
        output_file_name,
    )
}
