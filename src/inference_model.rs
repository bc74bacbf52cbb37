use crate::config::Config;
use clap::ValueEnum;

/// The two hosted models, one per mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InferenceModel {
    /// People count on a still image
    Headcount,
    /// Head boxes on live camera frames
    HeadDetection,
}

impl InferenceModel {
    pub fn model_id<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            InferenceModel::Headcount => &config.headcount_model,
            InferenceModel::HeadDetection => &config.head_detection_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_follows_config() {
        let config = Config {
            headcount_model: "crowd/7".into(),
            ..Default::default()
        };
        assert_eq!(InferenceModel::Headcount.model_id(&config), "crowd/7");
        assert_eq!(InferenceModel::HeadDetection.model_id(&config), "head-detection/2");
    }
}
