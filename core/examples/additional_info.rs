// bindery/examples/additional_info.rs

use bindery::{
  task_fn, AdditionalData, ChannelInfoProvider, InfoRequest, Job, Orchestrator, Report, Task, TaskDescriptor,
  TaskResults, UserArgs, Workflow,
};
use serde_json::{json, Value};
use tracing::info;

// A workflow that cannot plan until someone picks the title page of each book.
struct TitlePageWorkflow;

impl Workflow for TitlePageWorkflow {
  fn name(&self) -> &str {
    "select title pages"
  }

  fn job_options(&self) -> Vec<bindery::JobOption> {
    Vec::new()
  }

  fn initial_tasks(&self, _args: &UserArgs) -> anyhow::Result<Vec<Box<dyn Task>>> {
    // Pretend to scan the input folder for books.
    Ok(vec![task_fn("find books", |_ctx| async {
      Ok(json!(["atlas", "herbal"]))
    })])
  }

  fn additional_info_request(&self, _args: &UserArgs, initial_results: &[Value]) -> anyhow::Result<Option<InfoRequest>> {
    let books = initial_results.first().cloned().unwrap_or(Value::Null);
    Ok(Some(InfoRequest::new("Select the title page of each book", books)))
  }

  fn discover_task_metadata(
    &self,
    _initial_results: &[Value],
    additional: &AdditionalData,
    _args: &UserArgs,
  ) -> anyhow::Result<Vec<TaskDescriptor>> {
    Ok(
      additional
        .iter()
        .map(|(book, page)| TaskDescriptor::new(json!({ "book": book, "title_page": page })))
        .collect(),
    )
  }

  fn create_new_task(&self, descriptor: &TaskDescriptor) -> anyhow::Result<Box<dyn Task>> {
    let data = descriptor.data().clone();
    Ok(task_fn("write marc", move |_ctx| {
      let data = data.clone();
      async move { Ok(json!({ "marc": format!("{} (title page {})", data["book"], data["title_page"]) })) }
    }))
  }

  fn generate_report(&self, results: &TaskResults) -> anyhow::Result<Option<Report>> {
    Ok(Some(Report::text(format!("{} MARC records written", results.success_count()))))
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let (provider, mut prompts) = ChannelInfoProvider::new(1);

  // Stands in for the dialog a GUI would show.
  let frontend = tokio::spawn(async move {
    while let Some(prompt) = prompts.recv().await {
      info!(prompt = %prompt.request.prompt, payload = %prompt.request.payload, "Frontend received request.");
      let mut answer = AdditionalData::new();
      for book in prompt.request.payload.as_array().cloned().unwrap_or_default() {
        if let Some(name) = book.as_str() {
          answer.insert(name.to_string(), json!("00000003.tif"));
        }
      }
      if prompt.respond(answer).is_err() {
        info!("Job went away before the answer arrived.");
      }
    }
  });

  let job = Job::new(std::sync::Arc::new(TitlePageWorkflow))?;
  let outcome = Orchestrator::default().run(job, &provider).await;
  drop(provider);
  frontend.await?;

  match &outcome.report {
    Some(report) => println!("{}", report.summary),
    None => println!("{}", outcome.failure_summary().unwrap_or_default()),
  }
  Ok(())
}
