//! Prompt builders for the text generator

use crate::profile::NormalizedProfile;
use chrono::NaiveDate;
use std::fmt::Write;

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn or_unspecified(value: Option<&str>) -> &str {
    value.unwrap_or("Not specified")
}

/// Prompt asking for a seven-day plan as a bare JSON array
pub fn build_plan_prompt(profile: &NormalizedProfile, today: NaiveDate) -> String {
    let age = profile
        .age_on(today)
        .map(|years| years.to_string())
        .unwrap_or_else(|| "Not provided".to_string());

    let mut prompt = String::new();
    // Writing to a String cannot fail
    let _ = write!(
        prompt,
        "Create a comprehensive personalized health and fitness plan for {name}.

User Profile:
- Gender: {gender}
- Weight: {weight:.1}kg
- Height: {height:.1}cm
- BMI: {bmi:.1}
- Age: {age}
- Activity Level: {activity}

Primary Goal: {goal}
Exercise Frequency: {frequency}
Diet Preference: {diet}
Preferred Meals Per Day: {meals_per_day}
Plan Duration: {duration}

Nutrition Preferences:
- Favorite Nutrition Type: {nutrition_type}
- Food Allergies: {allergies}
- Nutrition Days per Week: {nutrition_days}
- Number of Meals: {meals_num}

Exercise Preferences:
- Favorite Workout Type: {workout}
- Workout Goal: {workout_goal}
- Workout Days per Week: {workout_days}

Health Considerations:
- Health Conditions: {health}
- Chronic Conditions: {chronic}
",
        name = profile.full_name.as_deref().unwrap_or("the user"),
        gender = profile.gender,
        weight = profile.weight_kg,
        height = profile.height_cm,
        bmi = profile.bmi,
        age = age,
        activity = profile.activity_level.description(),
        goal = profile.goal,
        frequency = profile.exercise_frequency,
        diet = profile.diet_preference,
        meals_per_day = profile.meals_per_day,
        duration = profile.plan_duration,
        nutrition_type = or_unspecified(profile.fav_nutrition_type.as_deref()),
        allergies = list_or_none(&profile.food_allergies),
        nutrition_days = profile.nutrition_days,
        meals_num = profile.meals_num,
        workout = or_unspecified(profile.fav_workout.as_deref()),
        workout_goal = or_unspecified(profile.workout_goal.as_deref()),
        workout_days = profile.workout_days,
        health = list_or_none(&profile.health_conditions),
        chronic = list_or_none(&profile.chronic_conditions),
    );

    let _ = write!(
        prompt,
        "
Please create a detailed 7-day health plan covering a day-by-day workout schedule \
suited to their fitness level and health conditions, and {meals} meals per day with \
portion sizes that respect their allergies and preferences.

IMPORTANT: Create exactly 7 days of content. Return the response as a JSON array with 7 objects. \
Each object should have this structure:
{{
  \"food\": {{
    \"breakfast\": [\"meal item 1\", \"meal item 2\"],
    \"lunch\": [\"meal item 1\", \"meal item 2\"],
    \"dinner\": [\"meal item 1\", \"meal item 2\"],
    \"snacks\": [\"snack 1\"]
  }},
  \"exercise\": [\"exercise 1\", \"exercise 2\", \"exercise 3\"]
}}

Return ONLY the JSON array, no other text or formatting.",
        meals = profile.meals_per_day,
    );

    prompt
}

/// Prompt for a single nutrition question
pub fn build_nutrition_prompt(question: &str, goal: Option<&str>, restrictions: Option<&str>) -> String {
    format!(
        "As a nutrition expert, answer this question: \"{}\"

Consider:
- User's goal: {}
- Dietary restrictions: {}

Provide practical, science-based advice that is easy to follow.",
        question.trim(),
        goal.unwrap_or("general health"),
        restrictions.unwrap_or("none"),
    )
}

/// Prompt for a one-off workout routine
pub fn build_workout_prompt(
    fitness_level: &str,
    available_time: &str,
    equipment: Option<&str>,
    goals: &str,
) -> String {
    format!(
        "Create a workout routine based on:
- Fitness Level: {}
- Available Time: {}
- Equipment: {}
- Goals: {}

Provide a detailed workout plan with warm-up exercises, the main routine with sets, \
reps and duration, cool-down exercises and safety tips. Make it practical and achievable.",
        fitness_level,
        available_time,
        equipment.unwrap_or("none"),
        goals,
    )
}
