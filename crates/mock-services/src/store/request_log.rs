use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::models::{RecordedRequest, ScriptedResponse};

/// 模拟服务共享状态
#[derive(Debug, Default)]
pub struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    script: Mutex<VecDeque<ScriptedResponse>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个预设响应
    pub fn push_response(&self, response: ScriptedResponse) {
        self.script.lock().push_back(response);
    }

    pub fn push_responses(&self, responses: impl IntoIterator<Item = ScriptedResponse>) {
        self.script.lock().extend(responses);
    }

    /// 弹出下一个预设响应
    pub fn next_response(&self) -> Option<ScriptedResponse> {
        self.script.lock().pop_front()
    }

    pub fn pending_responses(&self) -> usize {
        self.script.lock().len()
    }

    pub fn record(&self, request: RecordedRequest) {
        self.requests.lock().push(request);
    }

    /// 按到达顺序返回已记录请求的快照
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// 清空请求日志和脚本
    pub fn reset(&self) {
        self.requests.lock().clear();
        self.script.lock().clear();
    }
}
