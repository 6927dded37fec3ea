use super::ChainStrategy;
use turret_model::{OwnerKind, SettingCategory};

/// Device model of a turret
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelStrategy;

impl ChainStrategy for ModelStrategy {
    fn name(&self) -> &'static str {
        "model"
    }

    fn layer(&self) -> OwnerKind {
        OwnerKind::Model
    }

    fn lookup_category(&self, subject: SettingCategory) -> SettingCategory {
        subject.merged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_merged_category() {
        assert_eq!(
            ModelStrategy.lookup_category(SettingCategory::NetrixBoot),
            SettingCategory::TerminalBoot
        );
    }
}
