//! 检测结果更新工具
//! 负责将命中的技术连同其关联推导技术写入检测结果

use std::collections::{HashSet, VecDeque};
use tracing::warn;

use crate::compiler::CompiledRuleLibrary;
use crate::error::RsbuiltwithError;
use crate::rule::DetectionResult;

/// 检测结果更新工具
pub struct DetectionUpdater;

impl DetectionUpdater {
    /// 将技术及其关联推导技术写入检测结果
    ///
    /// 显式工作队列展开 implies 闭包：弹出一个技术名，在其所有分类下
    /// 幂等插入，只有本次确有新插入时才把它的 implies 目标入队。
    /// seen 集合保证每个技术名每次调用至多展开一次，推导环
    /// （A implies B、B implies A）因此必然终止。
    ///
    /// 推导目标在规则库中不存在时仅告警并丢弃该分支，
    /// 不影响其余技术的记录
    pub fn add_detected(
        result: &mut DetectionResult,
        tech_name: &str,
        library: &CompiledRuleLibrary,
    ) {
        let mut worklist = VecDeque::from([tech_name.to_string()]);
        let mut seen = HashSet::new();

        while let Some(name) = worklist.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }

            let Some(rule) = library.tech_rule(&name) else {
                warn!("{}", RsbuiltwithError::UnknownImplicationError(name));
                continue;
            };

            // 在每个分类下幂等插入
            let mut newly_inserted = false;
            for cat_id in &rule.category_ids {
                let Some(cat_name) = library.category_name(*cat_id) else {
                    // 编译成功后不可能出现，防御性跳过
                    continue;
                };
                let techs = result.entry(cat_name.to_string()).or_default();
                if !techs.iter().any(|existing| existing == &name) {
                    techs.push(name.clone());
                    newly_inserted = true;
                }
            }

            // 仅首次插入时展开推导，已记录过的技术不再展开
            if newly_inserted {
                for implied in &rule.implies {
                    worklist.push_back(implied.clone());
                }
            }
        }
    }
}
