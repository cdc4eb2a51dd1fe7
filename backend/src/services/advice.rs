//! One-off advice from the text generator

use crate::error::ApiError;
use crate::generator::TextGenerator;
use chrono::Utc;
use tracing::instrument;
use vitatone_shared::fields::non_empty_text;
use vitatone_shared::prompts::{build_nutrition_prompt, build_workout_prompt};
use vitatone_shared::types::{
    AdviceResponse, ChatRequest, NutritionAdviceRequest, WorkoutRoutineRequest,
};

/// Advice service for business logic
pub struct AdviceService;

impl AdviceService {
    #[instrument(skip_all)]
    pub async fn nutrition(
        generator: &dyn TextGenerator,
        request: NutritionAdviceRequest,
    ) -> Result<AdviceResponse, ApiError> {
        let question = required(&request.question, "Question is required")?;
        let prompt = build_nutrition_prompt(
            &question,
            request.user_goal.as_deref(),
            request.dietary_restrictions.as_deref(),
        );
        Self::ask(generator, &prompt).await
    }

    #[instrument(skip_all)]
    pub async fn workout(
        generator: &dyn TextGenerator,
        request: WorkoutRoutineRequest,
    ) -> Result<AdviceResponse, ApiError> {
        let message = "Fitness level, available time and goals are required";
        let fitness_level = required(&request.fitness_level, message)?;
        let available_time = required(&request.available_time, message)?;
        let goals = required(&request.goals, message)?;

        let prompt = build_workout_prompt(
            &fitness_level,
            &available_time,
            request.equipment.as_deref(),
            &goals,
        );
        Self::ask(generator, &prompt).await
    }

    /// Forward a free-form message unchanged
    #[instrument(skip_all)]
    pub async fn chat(
        generator: &dyn TextGenerator,
        request: ChatRequest,
    ) -> Result<AdviceResponse, ApiError> {
        let message = required(&request.message, "Message is required")?;
        Self::ask(generator, &message).await
    }

    async fn ask(generator: &dyn TextGenerator, prompt: &str) -> Result<AdviceResponse, ApiError> {
        let response = generator.generate(prompt).await?;
        Ok(AdviceResponse {
            response,
            generated_at: Utc::now(),
        })
    }
}

fn required(value: &str, message: &str) -> Result<String, ApiError> {
    non_empty_text(Some(value)).ok_or_else(|| ApiError::Validation(message.to_string()))
}
