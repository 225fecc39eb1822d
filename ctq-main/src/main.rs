use std::env;

mod demo_task;
mod random_delay_processor;
mod work_unit;

use demo_task::DemoTask;

fn main() -> anyhow::Result<()> {
    let task_config_file = env::args()
        .nth(1)
        .unwrap_or_else(|| "resources/task_config.ini".to_string());
    DemoTask::new(&task_config_file)?.run()
}
