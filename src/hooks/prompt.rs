use std::fmt;

use crate::error::Result;
use crate::hooks::PromptStyle;
use crate::models::{fields, GenerationMethod, GenerationRequest};

/// System instruction plus the method-specific user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.system, self.user)
    }
}

/// Renders the prompt for `request`. Required fields are checked before any
/// text is produced.
pub fn build_prompt(request: &GenerationRequest, style: PromptStyle) -> Result<Prompt> {
    for key in request.method.required_fields() {
        request.require(key)?;
    }

    let user = match style {
        PromptStyle::Concise => concise_user(request)?,
        PromptStyle::Standard => standard_user(request)?,
        PromptStyle::Advanced => advanced_user(request)?,
    };

    Ok(Prompt { system: system_prompt(style), user })
}

fn system_prompt(style: PromptStyle) -> String {
    match style {
        PromptStyle::Concise => format!(
            "You are an expert copywriter and marketing strategist specializing in creating compelling hooks and headlines that drive engagement and conversions. You understand the psychology of attention, the mechanics of viral content, and platform-specific best practices.

Your hooks should be:
- Attention-grabbing and curiosity-inducing
- Platform-appropriate and audience-specific
- Psychologically compelling (using proven triggers like loss aversion, social proof, urgency, etc.)
- Diverse in style and approach
- Professional yet engaging

Generate exactly {n} unique hooks/headlines. Each should be distinctly different in approach and style. Return only the hooks as a numbered list (1. 2. 3. etc.), one per line, with no additional text.",
            n = style.hook_count()
        ),
        PromptStyle::Standard => format!(
            "You are an expert copywriter specializing in creating compelling hooks and headlines that convert. Generate exactly {} numbered hooks/headlines based on the user input.",
            style.hook_count()
        ),
        PromptStyle::Advanced => ADVANCED_SYSTEM.to_string(),
    }
}

fn push_optional(parts: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        parts.push(format!("{label}: {v}"));
    }
}

fn styles_line(request: &GenerationRequest) -> Option<String> {
    let styles = request.styles();
    (!styles.is_empty()).then(|| styles.join(", "))
}

fn concise_user(request: &GenerationRequest) -> Result<String> {
    let n = PromptStyle::Concise.hook_count();
    let mut parts = Vec::new();
    match request.method {
        GenerationMethod::Brief => {
            let platform = request.require(fields::PLATFORM)?;
            parts.push(format!("Create {n} compelling hooks/headlines for:"));
            parts.push(format!("- Content Type: {}", request.require(fields::CONTENT_TYPE)?));
            parts.push(format!("- Platform: {platform}"));
            parts.push(format!("- Goal: {}", request.require(fields::GOAL)?));
            parts.push(format!("- Topic: {}", request.require(fields::TOPIC)?));
            parts.push(String::new());
            parts.push(format!(
                "Focus on {platform} best practices and make each hook unique in style (question, statement, number, controversy, story, etc.)."
            ));
        }
        GenerationMethod::RawIdea => {
            parts.push(format!("Transform this raw idea into {n} polished, compelling hooks/headlines:"));
            parts.push(String::new());
            parts.push(format!("Raw idea: \"{}\"", request.require(fields::RAW_IDEA)?));
            push_optional(&mut parts, "Target Audience", request.get(fields::AUDIENCE));
            push_optional(&mut parts, "Tone", request.get(fields::TONE));
            parts.push(String::new());
            parts.push("Make each hook approach the idea from a different angle (controversial, educational, story-driven, problem/solution, emotional, etc.).".into());
        }
        GenerationMethod::DraftOptimization => {
            parts.push(format!("Optimize and create {n} improved versions of this headline/hook:"));
            parts.push(String::new());
            parts.push(format!("Original: \"{}\"", request.require(fields::CURRENT_DRAFT)?));
            push_optional(&mut parts, "Issues to Fix", request.get(fields::ISSUES));
            push_optional(&mut parts, "Goal", request.get(fields::OPTIMIZATION_GOAL));
            push_optional(&mut parts, "Content Format", request.get(fields::FORMAT));
            parts.push(String::new());
            parts.push("Use different psychological triggers, improve clarity, add urgency/curiosity, and make each version distinctly different while maintaining the core message.".into());
        }
        GenerationMethod::ContentAnalysis => {
            parts.push(format!(
                "Analyze this content and create {n} compelling hooks/headlines that could be used to promote it:"
            ));
            parts.push(String::new());
            parts.push(format!("Content: \"{}\"", request.require(fields::CONTENT_PIECE)?));
            push_optional(&mut parts, "Content Type", request.get(fields::CONTENT_FORMAT));
            push_optional(&mut parts, "Preferred Styles", styles_line(request).as_deref());
            parts.push(String::new());
            parts.push("Extract key insights, benefits, or intriguing elements and craft hooks that would make people want to engage with this content.".into());
        }
    }
    Ok(parts.join("\n"))
}

fn standard_user(request: &GenerationRequest) -> Result<String> {
    let n = PromptStyle::Standard.hook_count();
    let mut parts = vec![format!("Generate {n} compelling hooks and headlines for:"), String::new()];
    let closing = match request.method {
        GenerationMethod::Brief => {
            parts.push(format!("Content Type: {}", request.require(fields::CONTENT_TYPE)?));
            parts.push(format!("Platform: {}", request.require(fields::PLATFORM)?));
            parts.push(format!("Goal: {}", request.require(fields::GOAL)?));
            parts.push(format!("Topic: {}", request.require(fields::TOPIC)?));
            "Create hooks that are attention-grabbing, specific to the platform, and aligned with the goal."
        }
        GenerationMethod::RawIdea => {
            parts.push(format!("Raw Idea: {}", request.require(fields::RAW_IDEA)?));
            push_optional(&mut parts, "Target Audience", request.get(fields::AUDIENCE));
            push_optional(&mut parts, "Tone", request.get(fields::TONE));
            "Transform this raw idea into polished, compelling hooks that capture the essence while adding structure and emotional appeal."
        }
        GenerationMethod::DraftOptimization => {
            parts.push(format!("Current Draft: {}", request.require(fields::CURRENT_DRAFT)?));
            push_optional(&mut parts, "Issues to Fix", request.get(fields::ISSUES));
            push_optional(&mut parts, "Goal", request.get(fields::OPTIMIZATION_GOAL));
            push_optional(&mut parts, "Content Format", request.get(fields::FORMAT));
            "Optimize and enhance this headline using proven copywriting techniques, emotional triggers, and curiosity gaps."
        }
        GenerationMethod::ContentAnalysis => {
            parts.push(format!("Content Piece: {}", request.require(fields::CONTENT_PIECE)?));
            push_optional(&mut parts, "Content Type", request.get(fields::CONTENT_FORMAT));
            push_optional(&mut parts, "Preferred Styles", styles_line(request).as_deref());
            "Analyze this content and create hooks that highlight the most compelling insights and draw readers in."
        }
    };
    parts.push(String::new());
    parts.push(closing.to_string());
    parts.push(String::new());
    parts.push(format!("Return exactly {n} numbered hooks (1. 2. 3. etc.) that are:"));
    parts.push("- Attention-grabbing\n- Curiosity-inducing\n- Specific and actionable\n- Optimized for engagement".into());
    Ok(parts.join("\n"))
}

fn advanced_user(request: &GenerationRequest) -> Result<String> {
    let n = PromptStyle::Advanced.hook_count();
    let mut parts = vec![
        format!("Generate {n} advanced psychological hooks using the frameworks above for:"),
        String::new(),
    ];

    match request.method {
        GenerationMethod::Brief => {
            let content_type = request.require(fields::CONTENT_TYPE)?;
            let platform = request.require(fields::PLATFORM)?;
            let goal = request.require(fields::GOAL)?;
            let topic = request.require(fields::TOPIC)?;
            parts.push("BRIEF ANALYSIS:".into());
            parts.push(format!("Content Type: {content_type}"));
            parts.push(format!("Platform: {platform}"));
            parts.push(format!("Goal: {goal}"));
            parts.push(format!("Topic: {topic}"));
            parts.push(String::new());
            parts.push("INSTRUCTIONS:\n- Apply industry-specific psychological frameworks\n- Use platform-appropriate frame combinations\n- Align with the stated goal using proven triggers\n- Include specific details and authority references\n- Create strong information gaps and curiosity\n- Use numbers, timelines, and concrete examples".into());
            parts.push(String::new());
            parts.push(format!(
                "FRAMEWORK APPLICATION:\nSelect the most effective combination of frames for this {platform} {content_type} about {topic} designed to {goal}."
            ));
        }
        GenerationMethod::RawIdea => {
            parts.push("RAW IDEA TRANSFORMATION:".into());
            parts.push(format!("Original Idea: \"{}\"", request.require(fields::RAW_IDEA)?));
            push_optional(&mut parts, "Target Audience", request.get(fields::AUDIENCE));
            push_optional(&mut parts, "Desired Tone", request.get(fields::TONE));
            parts.push(String::new());
            parts.push("INSTRUCTIONS:\n- Transform this raw concept using advanced psychological frameworks\n- Apply frame combination strategies to enhance impact\n- Create cognitive dissonance and curiosity gaps\n- Use authority positioning and social proof elements\n- Incorporate specific details and concrete examples\n- Layer multiple psychological triggers for maximum engagement".into());
            parts.push(String::new());
            parts.push("FRAMEWORK SELECTION:\nChoose frames that best serve the core message while adding psychological sophistication and emotional triggers.".into());
        }
        GenerationMethod::DraftOptimization => {
            parts.push("DRAFT OPTIMIZATION ANALYSIS:".into());
            parts.push(format!("Current Draft: \"{}\"", request.require(fields::CURRENT_DRAFT)?));
            push_optional(&mut parts, "Issues to Address", request.get(fields::ISSUES));
            push_optional(&mut parts, "Optimization Goal", request.get(fields::OPTIMIZATION_GOAL));
            push_optional(&mut parts, "Content Format", request.get(fields::FORMAT));
            parts.push(String::new());
            parts.push("INSTRUCTIONS:\n- Analyze the current draft for psychological weaknesses\n- Apply advanced frame combinations to strengthen impact\n- Address identified issues using proven psychological principles\n- Enhance with authority positioning, social proof, or scarcity\n- Create stronger information gaps and emotional engagement\n- Use specific numbers, timelines, and concrete details".into());
            parts.push(String::new());
            parts.push("OPTIMIZATION STRATEGY:\nTransform the existing hook using sophisticated psychological frameworks while maintaining the core message integrity.".into());
        }
        GenerationMethod::ContentAnalysis => {
            parts.push("CONTENT ANALYSIS FOR HOOK EXTRACTION:".into());
            parts.push(format!("Content Piece: \"{}\"", request.require(fields::CONTENT_PIECE)?));
            push_optional(&mut parts, "Content Type", request.get(fields::CONTENT_FORMAT));
            push_optional(&mut parts, "Preferred Styles", styles_line(request).as_deref());
            parts.push(String::new());
            parts.push("INSTRUCTIONS:\n- Analyze the content for key insights and emotional triggers\n- Extract the most compelling psychological elements\n- Apply advanced frame combinations to highlight key points\n- Create hooks that draw readers into the full content\n- Use authority positioning and social proof where relevant\n- Incorporate specific details and concrete examples from the content".into());
            parts.push(String::new());
            parts.push("EXTRACTION STRATEGY:\nIdentify the strongest psychological elements in the content and transform them into sophisticated hooks using proven frameworks.".into());
        }
    }

    parts.push(String::new());
    parts.push(format!(
        "FRAMEWORK REQUIREMENTS:
1. Use at least 3 different frame combinations across the {n} hooks
2. Include specific numbers, percentages, or timelines where appropriate
3. Incorporate authority figures, insider perspectives, or social proof
4. Create strong curiosity gaps and information deficits
5. Apply industry-appropriate psychological triggers
6. Avoid generic language - be specific and concrete
7. Layer multiple psychological principles for maximum impact

Return exactly {n} numbered hooks that demonstrate mastery of advanced copywriting psychology."
    ));
    Ok(parts.join("\n"))
}

const ADVANCED_SYSTEM: &str = r#"You are an expert copywriter with deep knowledge of psychological frameworks and advanced hook techniques. You specialize in creating hooks that leverage:

PSYCHOLOGICAL FOUNDATIONS:
- Pattern Recognition and Interruption
- Information Gap Theory and Curiosity Triggers
- Cognitive Dissonance Creation
- Status Threat/Opportunity Recognition
- Loss Aversion and Prospect Theory
- Social Proof Mechanisms
- Authority Influence and Scarcity Response

FRAME COMBINATION STRATEGIES:
- Primary + Supporting Frame Structure
- Triple Frame Layering for complex impact
- Information-Gap + Social Proof combinations
- Warning + Case Study pairings
- Insider Confession + Taboo Solution merging

HOOK FRAMEWORKS TO UTILIZE:
1. Information-Gap + Social Proof: "The [hidden strategy/secret] that [authority figures] never share publicly"
2. Warning + Future Event: "Why [current situation] may be at risk when [known future event] happens"
3. Taboo Solution + Case Study: "Why I told [someone] to [controversial action]: A revealing case study"
4. System/Strategy + Timeline: "The [framework/method]: How to [achieve result] in [specific timeframe]"
5. Insider Confession + Secret Society: "Confessions of a former [insider]: The [methods] [elite group] use internally"
6. New Discovery + Authority Challenge: "New [research/discovery] proves [established authority] wrong about [topic]"
7. Contrarian Position + Success Story: "[Surprising approach] that [achieved remarkable result]"
8. Method Reveal + Social Validation: "How [relatable person] [achieved goal] using [unconventional method]"

INDUSTRY-SPECIFIC APPLICATIONS:
- Finance: Focus on risk, opportunity, insider knowledge, market secrets
- Health: Emphasize discovery, transformation, authority challenges, hidden dangers
- Business: Highlight growth, efficiency, competitive advantage, insider strategies
- Education: Stress learning breakthroughs, skill acceleration, knowledge gaps
- Coaching: Feature transformation, breakthrough moments, mindset shifts

ADVANCED TECHNIQUES:
- Use specific numbers and percentages for credibility
- Include timeline references (30-60-10, "in one weekend", "last year")
- Incorporate authority figures and insider perspectives
- Create cognitive dissonance with unexpected combinations
- Layer multiple psychological triggers simultaneously

Generate 10 numbered hooks that:
1. Use advanced psychological frameworks
2. Combine multiple frames for enhanced impact
3. Are specific to the industry/context provided
4. Include concrete details and numbers when possible
5. Create strong curiosity gaps and emotional engagement
6. Avoid generic language and cliched phrases
7. Demonstrate deep understanding of target audience psychology"#;
