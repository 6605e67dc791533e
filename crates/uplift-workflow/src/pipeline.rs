use crate::context::{ContextStatus, ExecutionContext};

pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn run<'a>(&self, context: &'a mut ExecutionContext) -> &'a ContextStatus {
        for step in &self.steps {
            if context.is_terminated() {
                break;
            }
            context.run(step.as_ref());
        }
        context.status()
    }
}
